use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub class_fill: String,
    pub class_border: String,
    pub class_border_width: f32,
    pub divider_color: String,
    pub divider_width: f32,
    pub line_color: String,
    /// Fill of hollow arrow heads.
    pub hollow_fill: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            class_fill: "#FAEBD7".to_string(),
            class_border: "#000000".to_string(),
            class_border_width: 1.0,
            divider_color: "black".to_string(),
            divider_width: 2.0,
            line_color: "#000000".to_string(),
            hollow_fill: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            class_fill: "#F8FAFF".to_string(),
            class_border: "#C7D2E5".to_string(),
            class_border_width: 1.0,
            divider_color: "#C7D2E5".to_string(),
            divider_width: 1.0,
            line_color: "#7A8AA6".to_string(),
            hollow_fill: "#FFFFFF".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
