/// Case conversion applied by `#[docshape(rename_all = "..")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenameRule {
    CamelCase,
    SnakeCase,
    KebabCase,
    PascalCase,
    ScreamingSnakeCase,
    ScreamingKebabCase,
    Lowercase,
    Uppercase,
}

impl RenameRule {
    pub(crate) const ACCEPTED: &'static str = "camelCase, snake_case, kebab-case, PascalCase, \
        SCREAMING_SNAKE_CASE, SCREAMING-KEBAB-CASE, lowercase, UPPERCASE";

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "camelCase" => Some(RenameRule::CamelCase),
            "snake_case" => Some(RenameRule::SnakeCase),
            "kebab-case" => Some(RenameRule::KebabCase),
            "PascalCase" => Some(RenameRule::PascalCase),
            "SCREAMING_SNAKE_CASE" => Some(RenameRule::ScreamingSnakeCase),
            "SCREAMING-KEBAB-CASE" => Some(RenameRule::ScreamingKebabCase),
            "lowercase" => Some(RenameRule::Lowercase),
            "UPPERCASE" => Some(RenameRule::Uppercase),
            _ => None,
        }
    }

    pub(crate) fn apply(self, name: &str) -> String {
        let words = split_into_words(name);
        match self {
            RenameRule::CamelCase => words
                .iter()
                .enumerate()
                .map(|(i, word)| {
                    if i == 0 {
                        word.to_lowercase()
                    } else {
                        capitalize(word)
                    }
                })
                .collect(),
            RenameRule::PascalCase => words.iter().map(|word| capitalize(word)).collect(),
            RenameRule::SnakeCase => join(&words, "_", str::to_lowercase),
            RenameRule::KebabCase => join(&words, "-", str::to_lowercase),
            RenameRule::ScreamingSnakeCase => join(&words, "_", str::to_uppercase),
            RenameRule::ScreamingKebabCase => join(&words, "-", str::to_uppercase),
            RenameRule::Lowercase => name.to_lowercase(),
            RenameRule::Uppercase => name.to_uppercase(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn join(words: &[String], sep: &str, case: fn(&str) -> String) -> String {
    words
        .iter()
        .map(|word| case(word))
        .collect::<Vec<_>>()
        .join(sep)
}

/// Splits `snake_case`, `kebab-case` and `camelCase` identifiers into words.
fn split_into_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            if !current.is_empty() {
                words.push(core::mem::take(&mut current));
            }
        } else if ch.is_uppercase() && current.chars().last().is_some_and(|c| !c.is_uppercase()) {
            words.push(core::mem::take(&mut current));
            current.push(ch);
        } else {
            current.push(ch);
        }
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::RenameRule;

    #[test]
    fn converts_snake_case_fields() {
        assert_eq!(RenameRule::CamelCase.apply("created_at"), "createdAt");
        assert_eq!(RenameRule::PascalCase.apply("created_at"), "CreatedAt");
        assert_eq!(RenameRule::KebabCase.apply("created_at"), "created-at");
        assert_eq!(
            RenameRule::ScreamingSnakeCase.apply("created_at"),
            "CREATED_AT"
        );
    }

    #[test]
    fn converts_pascal_case_variants() {
        assert_eq!(RenameRule::SnakeCase.apply("OnHold"), "on_hold");
        assert_eq!(RenameRule::ScreamingKebabCase.apply("OnHold"), "ON-HOLD");
        assert_eq!(RenameRule::Lowercase.apply("OnHold"), "onhold");
        assert_eq!(RenameRule::Uppercase.apply("OnHold"), "ONHOLD");
    }

    #[test]
    fn acronyms_stay_together() {
        assert_eq!(RenameRule::SnakeCase.apply("HTTPStatus"), "httpstatus");
        assert_eq!(RenameRule::SnakeCase.apply("OrderID"), "order_id");
    }

    #[test]
    fn unknown_rules_are_rejected() {
        assert_eq!(RenameRule::parse("Train-Case"), None);
        assert_eq!(RenameRule::parse("camelCase"), Some(RenameRule::CamelCase));
    }
}
