/// Visual classification of the upload status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusClass {
    #[default]
    Neutral,
    Uploading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    pub text: String,
    pub class: StatusClass,
    pub visible: bool,
}

impl StatusLine {
    pub fn show(&mut self, text: impl Into<String>, class: StatusClass) {
        self.text = text.into();
        self.class = class;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.text.clear();
        self.class = StatusClass::Neutral;
        self.visible = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractButton {
    pub enabled: bool,
    /// Fill percentage while an extraction job is running.
    pub processing: Option<u8>,
    pub label: String,
}

/// Fields carried into the eventual extraction submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    pub temp_filename: String,
    hidden_fields: Vec<(String, String)>,
}

impl FormState {
    /// Sets a hidden field, replacing any earlier value under the same name.
    pub fn set_hidden_field(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.hidden_fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.hidden_fields.push((name.to_string(), value)),
        }
    }

    pub fn hidden_field(&self, name: &str) -> Option<&str> {
        self.hidden_fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn hidden_fields(&self) -> &[(String, String)] {
        &self.hidden_fields
    }

    /// Name/value pairs in submission order, carrier field first.
    pub fn submission_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![("temp_filename".to_string(), self.temp_filename.clone())];
        fields.extend(self.hidden_fields.iter().cloned());
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultsSection {
    pub active: bool,
    pub body: String,
}

/// Everything the upload flow reads or writes on screen. The toolkit layer
/// only draws this; all mutation goes through the controller and presenter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetModel {
    pub file_name_display: String,
    pub upload_status: StatusLine,
    pub extract_button: ExtractButton,
    pub form: FormState,
    pub results_section: ResultsSection,
}

impl WidgetModel {
    pub fn new(extract_label: &str) -> Self {
        Self {
            extract_button: ExtractButton {
                enabled: false,
                processing: None,
                label: extract_label.to_string(),
            },
            ..Default::default()
        }
    }
}

/// Downstream extraction job sharing the extract button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingState {
    #[default]
    Idle,
    Processing(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_field_is_replaced_not_duplicated() {
        let mut form = FormState::default();
        form.set_hidden_field("original_filename", "a.pdf");
        form.set_hidden_field("original_filename", "b.pdf");

        assert_eq!(form.hidden_fields().len(), 1);
        assert_eq!(form.hidden_field("original_filename"), Some("b.pdf"));
    }

    #[test]
    fn submission_puts_carrier_first() {
        let mut form = FormState {
            temp_filename: "tmp123".to_string(),
            ..Default::default()
        };
        form.set_hidden_field("original_filename", "report.pdf");

        assert_eq!(
            form.submission_fields(),
            vec![
                ("temp_filename".to_string(), "tmp123".to_string()),
                ("original_filename".to_string(), "report.pdf".to_string()),
            ]
        );
    }

    #[test]
    fn hiding_status_resets_class() {
        let mut line = StatusLine::default();
        line.show("x", StatusClass::Error);
        line.hide();
        assert_eq!(line, StatusLine::default());
    }
}
