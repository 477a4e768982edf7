use serde::Deserialize;

/// Language of the status vocabulary shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Zh,
    En,
}

impl Locale {
    pub fn uploading_started(self) -> &'static str {
        match self {
            Locale::Zh => "上传中...",
            Locale::En => "Uploading...",
        }
    }

    pub fn uploading(self, percent: u8) -> String {
        match self {
            Locale::Zh => format!("上传中：{}%", percent),
            Locale::En => format!("Uploading: {}%", percent),
        }
    }

    pub fn upload_complete(self) -> &'static str {
        match self {
            Locale::Zh => "上传完成",
            Locale::En => "Upload complete",
        }
    }

    pub fn upload_failed(self) -> &'static str {
        match self {
            Locale::Zh => "上传失败",
            Locale::En => "Upload failed",
        }
    }

    pub fn upload_error(self) -> &'static str {
        match self {
            Locale::Zh => "上传出错",
            Locale::En => "Upload error",
        }
    }

    pub fn upload_canceled(self) -> &'static str {
        match self {
            Locale::Zh => "上传取消",
            Locale::En => "Upload canceled",
        }
    }

    pub fn extract_label(self) -> &'static str {
        match self {
            Locale::Zh => "提取",
            Locale::En => "Extract",
        }
    }

    pub fn copied(self) -> &'static str {
        match self {
            Locale::Zh => "复制成功",
            Locale::En => "Copied",
        }
    }

    pub fn copy(self) -> &'static str {
        match self {
            Locale::Zh => "复制",
            Locale::En => "Copy",
        }
    }

    pub fn copy_failed(self) -> &'static str {
        match self {
            Locale::Zh => "复制失败，请手动复制",
            Locale::En => "Copy failed, please copy manually",
        }
    }

    pub fn choose_file(self) -> &'static str {
        match self {
            Locale::Zh => "选择 PDF 文件",
            Locale::En => "Choose PDF file",
        }
    }

    pub fn cancel(self) -> &'static str {
        match self {
            Locale::Zh => "取消",
            Locale::En => "Cancel",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Locale::Zh => "PDF 内容提取",
            Locale::En => "PDF Extractor",
        }
    }

    pub fn clear(self) -> &'static str {
        match self {
            Locale::Zh => "清除",
            Locale::En => "Clear",
        }
    }

    pub fn language_label(self) -> &'static str {
        match self {
            Locale::Zh => "选择语言",
            Locale::En => "Language",
        }
    }

    pub fn uploaded_as(self) -> &'static str {
        match self {
            Locale::Zh => "临时文件：",
            Locale::En => "Stored as:",
        }
    }
}

/// Prompt language sent with the extraction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractLanguage {
    #[default]
    Cn,
    En,
}

impl ExtractLanguage {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractLanguage::Cn => "cn",
            ExtractLanguage::En => "en",
        }
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (ExtractLanguage::Cn, Locale::Zh) => "中文",
            (ExtractLanguage::En, Locale::Zh) => "英语",
            (ExtractLanguage::Cn, Locale::En) => "Chinese",
            (ExtractLanguage::En, Locale::En) => "English",
        }
    }
}
