use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};

// Filters registered on every ScriptEngine environment. The signatures match
// what minijinja accepts as a filter.

pub fn camelcase(s: String) -> String {
    s.to_lower_camel_case()
}

pub fn pascalcase(s: String) -> String {
    s.to_pascal_case()
}

pub fn snakecase(s: String) -> String {
    s.to_snake_case()
}

pub fn kebabcase(s: String) -> String {
    s.to_kebab_case()
}

pub fn screamingsnakecase(s: String) -> String {
    s.to_shouty_snake_case()
}

/// Repeats `s` `count` times, handy for rules: `{{ '-' | repeat(40) }}`.
pub fn repeat(s: String, count: usize) -> String {
    s.repeat(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_filters() {
        assert_eq!(camelcase("gross income".into()), "grossIncome");
        assert_eq!(pascalcase("gross income".into()), "GrossIncome");
        assert_eq!(snakecase("GrossIncome".into()), "gross_income");
        assert_eq!(kebabcase("GrossIncome".into()), "gross-income");
        assert_eq!(screamingsnakecase("gross income".into()), "GROSS_INCOME");
    }

    #[test]
    fn test_repeat() {
        assert_eq!(repeat("=".into(), 4), "====");
        assert_eq!(repeat("ab".into(), 0), "");
    }
}
