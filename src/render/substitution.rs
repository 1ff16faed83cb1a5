//! Label substitution over an already rendered body.

/// One `key:label` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub key: String,
    pub label: String,
}

/// Rules in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionRules {
    rules: Vec<SubstitutionRule>,
}

impl SubstitutionRules {
    /// Parse newline-delimited `key:label` lines.
    ///
    /// Each line is split on its first colon; the label is trimmed. Lines without a
    /// colon, or with an empty key or label, are skipped.
    pub fn parse(text: &str) -> Self {
        let rules = text
            .lines()
            .filter_map(|line| {
                let (key, label) = line.split_once(':')?;
                let label = label.trim();
                if key.is_empty() || label.is_empty() {
                    return None;
                }
                Some(SubstitutionRule {
                    key: key.to_string(),
                    label: label.to_string(),
                })
            })
            .collect();

        Self { rules }
    }

    pub fn from_pairs<K: Into<String>, L: Into<String>>(pairs: impl IntoIterator<Item = (K, L)>) -> Self {
        Self {
            rules: pairs
                .into_iter()
                .map(|(key, label)| SubstitutionRule {
                    key: key.into(),
                    label: label.into(),
                })
                .collect(),
        }
    }

    /// Replace `*key*` with `*label*`, rule by rule.
    ///
    /// Each rule scans the output of the previous one, so a later rule can rewrite
    /// a label produced by an earlier rule.
    pub fn apply(&self, body: &str) -> String {
        self.rules.iter().fold(body.to_string(), |text, rule| {
            text.replace(&format!("*{}*", rule.key), &format!("*{}*", rule.label))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubstitutionRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
