//! Snippets compiled into the fixture file.
//!
//! Binary operations mix strings and ints on purpose so the reference
//! compiler's constant folder leaves them alone.

use code_object::TestCase;

pub const CATALOGUE: &[TestCase<'static>] = &[
    TestCase::eval(r#"1"#),
    TestCase::eval(r#""hello""#),
    TestCase::eval(r#"a"#),
    // BinOps
    TestCase::eval(r#""a"+1"#),
    TestCase::eval(r#""a"-1"#),
    TestCase::eval(r#""a"*"b""#),
    TestCase::eval(r#""a"/1"#),
    TestCase::eval(r#""a"%1"#),
    TestCase::eval(r#""a"**1"#),
    TestCase::eval(r#""a"<<1"#),
    TestCase::eval(r#""a">>1"#),
    TestCase::eval(r#""a"|1"#),
    TestCase::eval(r#""a"^1"#),
    TestCase::eval(r#""a"&1"#),
    TestCase::eval(r#""a"//1"#),
    TestCase::eval(r#"a+a"#),
    TestCase::eval(r#""a"*"a""#),
    // UnaryOps
    TestCase::eval(r#"~ "a""#),
    TestCase::eval(r#"not "a""#),
    TestCase::eval(r#"+"a""#),
    TestCase::eval(r#"-"a""#),
    // BoolOps
    TestCase::eval(r#"1 and 2"#),
    TestCase::eval(r#"1 and 2 and 3 and 4"#),
    TestCase::eval(r#"1 and 2"#),
    TestCase::eval(r#"1 or 2"#),
    TestCase::eval(r#"1 or 2 or 3 or 4"#),
    // Brackets
    TestCase::eval(r#""1"+"2"*"3""#),
    TestCase::eval(r#""1"+("2"*"3")"#),
    TestCase::eval(r#"(1+"2")*"3""#),
    // IfExp
    TestCase::eval(r#"(a if b else c)+0"#),
    // Compare
    TestCase::eval(r#"a == b"#),
    TestCase::eval(r#"a != b"#),
    TestCase::eval(r#"a < b"#),
    TestCase::eval(r#"a <= b"#),
    TestCase::eval(r#"a > b"#),
    TestCase::eval(r#"a >= b"#),
    TestCase::eval(r#"a is b"#),
    TestCase::eval(r#"a is not b"#),
    TestCase::eval(r#"a in b"#),
    TestCase::eval(r#"a not in b"#),
    TestCase::eval(r#"(a < b < c)+0"#),
    TestCase::eval(r#"(a < b < c < d)+0"#),
    TestCase::eval(r#"(a < b < c < d < e)+0"#),
];

/// Human-readable listing, one `index mode source` line per entry.
pub fn listing(cases: &[TestCase<'_>]) -> String {
    cases
        .iter()
        .enumerate()
        .map(|(index, case)| format!("{index:>3}  {:<6}  {}\n", case.mode, case.source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use code_object::Mode;

    #[test]
    fn catalogue_starts_with_literals() {
        assert_eq!(CATALOGUE[0].source, "1");
        assert_eq!(CATALOGUE[1].source, "\"hello\"");
        assert_eq!(CATALOGUE[2].source, "a");
    }

    #[test]
    fn catalogue_is_all_eval() {
        assert_eq!(CATALOGUE.len(), 43);
        assert!(CATALOGUE.iter().all(|case| case.mode == Mode::Eval));
    }

    #[test]
    fn duplicates_are_kept() {
        let count = CATALOGUE
            .iter()
            .filter(|case| case.source == "1 and 2")
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn comparison_chains_grow() {
        let tail: Vec<_> = CATALOGUE[CATALOGUE.len() - 3..]
            .iter()
            .map(|case| case.source)
            .collect();
        assert_eq!(
            tail,
            [
                "(a < b < c)+0",
                "(a < b < c < d)+0",
                "(a < b < c < d < e)+0"
            ]
        );
    }

    #[test]
    fn listing_has_one_line_per_entry() {
        let text = listing(&CATALOGUE[..2]);
        assert_eq!(text, "  0  eval    1\n  1  eval    \"hello\"\n");
    }
}
