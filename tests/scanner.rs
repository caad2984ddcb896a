#[cfg(test)]
mod scanner_tests {
    use pulse::error::PulseError;
    use pulse::scanner::*;
    use pulse::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_brackets_and_operators() {
        assert_token_sequence(
            "a[0] != b <= c == !d",
            &[
                (TokenType::IDENTIFIER, "a"),
                (TokenType::LEFT_BRACKET, "["),
                (TokenType::NUMBER(0.0), "0"),
                (TokenType::RIGHT_BRACKET, "]"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::IDENTIFIER, "b"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::IDENTIFIER, "c"),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::BANG, "!"),
                (TokenType::IDENTIFIER, "d"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords() {
        assert_token_sequence(
            "fun function var while for_ orchid or",
            &[
                (TokenType::FUN, "fun"),
                (TokenType::FUN, "function"),
                (TokenType::VAR, "var"),
                (TokenType::WHILE, "while"),
                (TokenType::IDENTIFIER, "for_"),
                (TokenType::IDENTIFIER, "orchid"),
                (TokenType::OR, "or"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_literals_carry_decoded_values() {
        let tokens: Vec<Token> = Scanner::new("\"hi there\" 3.25 7")
            .collect::<Result<_, PulseError>>()
            .expect("source should scan");

        assert!(matches!(&tokens[0].token_type, TokenType::STRING(s) if s == "hi there"));
        assert_eq!(tokens[0].lexeme, "\"hi there\"");
        assert!(matches!(tokens[1].token_type, TokenType::NUMBER(n) if n == 3.25));
        assert!(matches!(tokens[2].token_type, TokenType::NUMBER(n) if n == 7.0));
    }

    #[test]
    fn test_comments_and_lines() {
        let source = "// leading comment\nvar x; // trailing\n\n\"two\nlines\"";
        let tokens: Vec<Token> = Scanner::new(source)
            .collect::<Result<_, PulseError>>()
            .expect("source should scan");

        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();

        // var x ; "two\nlines" EOF
        assert_eq!(lines, vec![2, 2, 2, 5, 5]);
    }

    #[test]
    fn test_unterminated_string() {
        let results: Vec<_> = Scanner::new("\"never closed").collect();

        assert_eq!(results.len(), 2);
        let err = results[0].as_ref().expect_err("should be an error");
        assert_eq!(err.to_string(), "[line 1] Error: Unterminated string.");
        assert!(matches!(&results[1], Ok(t) if t.token_type == TokenType::EOF));
    }

    #[test]
    fn test_non_ascii_character_is_reported_once() {
        let results: Vec<_> = Scanner::new("a é b").collect();

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(errors, vec!["[line 1] Error: Unexpected character: é"]);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
    }

    #[test]
    fn test_token_display() {
        assert_eq!(
            Token::new(TokenType::NUMBER(3.0), "3", 1).to_string(),
            "NUMBER 3 3.0"
        );
        assert_eq!(
            Token::new(TokenType::NUMBER(1.5), "1.5", 1).to_string(),
            "NUMBER 1.5 1.5"
        );
        assert_eq!(
            Token::new(TokenType::STRING("hi".into()), "\"hi\"", 1).to_string(),
            "STRING \"hi\" hi"
        );
        assert_eq!(
            Token::new(TokenType::IDENTIFIER, "foo", 1).to_string(),
            "IDENTIFIER foo null"
        );
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let scanner = Scanner::new(source);

        // Collect all results (both tokens and errors)
        let results: Vec<_> = scanner.collect();

        // We expect this sequence:
        // 0: COMMA ','
        // 1: DOT '.'
        // 2: Error for '$'
        // 3: LEFT_PAREN '('
        // 4: Error for '#'
        // 5: EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        // Check valid tokens
        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2, "Expected 2 error messages");

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                err.to_string().contains("Unexpected character"),
                "Error message should contain 'Unexpected character', got: {}",
                err
            );
        }

        // Helper function
        fn assert_token_matches(
            result: &Result<Token, PulseError>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(
                        token.token_type, expected_type,
                        "Expected token type {:?}, got {:?}",
                        expected_type, token.token_type
                    );
                    assert_eq!(
                        token.lexeme, expected_lexeme,
                        "Expected lexeme '{}', got '{}'",
                        expected_lexeme, token.lexeme
                    );
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }
}
