//! Product name cleaning
//!
//! Names reach the pipeline from two places: product card titles and the
//! listings of feature pages. Both go through [`clean_product_name`] so the
//! feature-product join compares like with like.

/// Strips decoration from a product name
///
/// Backslashes are removed, then decoration characters and double quotes are
/// trimmed from both ends and a pair of enclosing single quotes is removed,
/// repeatedly, until nothing changes. The result is a fixed point, so cleaning
/// is idempotent.
pub fn clean_product_name(raw: &str, decoration: &str) -> String {
    let mut name = raw.replace('\\', "");

    loop {
        let trimmed = name.trim_matches(|c: char| c == '"' || decoration.contains(c));
        let trimmed = trimmed
            .strip_prefix('\'')
            .and_then(|inner| inner.strip_suffix('\''))
            .unwrap_or(trimmed);

        if trimmed.len() == name.len() {
            return name;
        }
        name = trimmed.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECORATION: &str = " \n\t\r";

    #[test]
    fn test_strips_decoration() {
        assert_eq!(clean_product_name("\n  Snake Plant \t\n", DECORATION), "Snake Plant");
        assert_eq!(clean_product_name("Snake Plant", DECORATION), "Snake Plant");
        assert_eq!(clean_product_name("", DECORATION), "");
    }

    #[test]
    fn test_strips_quotes_and_backslashes() {
        assert_eq!(clean_product_name(r#""Bird's Nest Fern""#, DECORATION), "Bird's Nest Fern");
        assert_eq!(clean_product_name("'Calathea'", DECORATION), "Calathea");
        assert_eq!(clean_product_name(r#"'"Calathea"'"#, DECORATION), "Calathea");
        assert_eq!(clean_product_name(r"Pilea \'Moon\'", DECORATION), "Pilea 'Moon'");
    }

    #[test]
    fn test_keeps_inner_apostrophes() {
        assert_eq!(clean_product_name("Bird's Nest", DECORATION), "Bird's Nest");
        assert_eq!(clean_product_name("'Bird's Nest", DECORATION), "'Bird's Nest");
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let inputs = [
            "",
            " ",
            "'",
            "''",
            "\"",
            "\"'\"",
            "'\"abc'",
            "'\"abc\"'",
            "  \"'Monstera'\"  ",
            "\\\"Fern\\\"",
            "\n\tString of Pearls\n",
            "' spaced '",
            "\"' \"x\" '\"",
            "a'",
            "'a",
            "Peace Lily",
        ];

        for input in inputs {
            let once = clean_product_name(input, DECORATION);
            let twice = clean_product_name(&once, DECORATION);
            assert_eq!(once, twice, "cleaning {:?} is not idempotent", input);
        }
    }

    #[test]
    fn test_custom_decoration_set() {
        assert_eq!(clean_product_name("**Fern**", "*"), "Fern");
        assert_eq!(clean_product_name(" Fern ", ""), " Fern ");
    }
}
