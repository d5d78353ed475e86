/// Application or window menu. Only the structure is tracked here; the
/// binding layer turns it into a native menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub accelerator: Option<String>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, label: impl Into<String>, accelerator: Option<&str>) -> Self {
        self.items.push(MenuItem {
            label: label.into(),
            accelerator: accelerator.map(str::to_string),
        });
        self
    }
}
