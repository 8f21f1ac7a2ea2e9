use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// Pretty JSON, machine-parseable
    Json,
}

impl OutputFormat {
    /// Render `data` for stdout: `text` is used as-is for [`Self::Text`].
    ///
    /// # Errors
    /// Returns the serializer error for [`Self::Json`].
    pub fn render<T: Serialize>(
        self,
        data: &T,
        text: impl FnOnce() -> String,
    ) -> serde_json::Result<String> {
        match self {
            Self::Text => Ok(text()),
            Self::Json => serde_json::to_string_pretty(data).map(|mut s| {
                s.push('\n');
                s
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        score: f64,
    }

    #[test]
    fn default_is_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn text_uses_the_closure() {
        let out = OutputFormat::Text
            .render(&Sample { score: 0.5 }, || "score 0.5\n".to_owned())
            .unwrap();
        assert_eq!(out, "score 0.5\n");
    }

    #[test]
    fn json_serializes_data() {
        let out = OutputFormat::Json
            .render(&Sample { score: 0.5 }, || unreachable!())
            .unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["score"], 0.5);
    }

    #[test]
    fn parses_from_cli_names() {
        use clap::ValueEnum as _;
        assert_eq!(OutputFormat::from_str("json", true).unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("TEXT", true).unwrap(), OutputFormat::Text);
        assert!(OutputFormat::from_str("toon", true).is_err());
    }
}
