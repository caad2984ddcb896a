#[cfg(test)]
mod parser_tests {
    use pulse::ast::{Expr, Stmt};
    use pulse::ast_printer::AstPrinter;
    use pulse::error::PulseError;
    use pulse::parser::Parser;
    use pulse::scanner::Scanner;
    use pulse::token::{Token, TokenType};

    fn tokens(source: &str) -> Vec<Token> {
        Scanner::new(source)
            .collect::<Result<_, PulseError>>()
            .expect("source should scan")
    }

    fn parse(source: &str) -> Result<Vec<Stmt>, Vec<PulseError>> {
        Parser::new(tokens(source)).parse()
    }

    fn expr(source: &str) -> String {
        let expr = Parser::new(tokens(source))
            .parse_expression()
            .expect("expression should parse");

        AstPrinter::print(&expr)
    }

    fn program(source: &str) -> Vec<String> {
        parse(source)
            .expect("program should parse")
            .iter()
            .map(AstPrinter::print_stmt)
            .collect()
    }

    fn errors(source: &str) -> Vec<String> {
        parse(source)
            .expect_err("program should not parse")
            .iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn test_precedence_layers() {
        assert_eq!(expr("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
        assert_eq!(expr("(1 + 2) * 3"), "(* (group (+ 1.0 2.0)) 3.0)");
        assert_eq!(expr("1 < 2 == true"), "(== (< 1.0 2.0) true)");
        assert_eq!(expr("a or b and c"), "(or a (and b c))");
        assert_eq!(expr("!a == b"), "(== (! a) b)");
    }

    #[test]
    fn test_left_associative_binary() {
        assert_eq!(expr("10 - 4 - 3"), "(- (- 10.0 4.0) 3.0)");
        assert_eq!(expr("8 / 4 / 2"), "(/ (/ 8.0 4.0) 2.0)");
        assert_eq!(expr("a or b or c"), "(or (or a b) c)");
    }

    #[test]
    fn test_right_associative_unary_and_assignment() {
        assert_eq!(expr("!!true"), "(! (! true))");
        assert_eq!(expr("-1 - -2"), "(- (- 1.0) (- 2.0))");
        assert_eq!(expr("a = b = c"), "(= a (= b c))");
    }

    #[test]
    fn test_postfix_calls_and_subscripts() {
        assert_eq!(expr("f(1, 2)(3)"), "(call (call f 1.0 2.0) 3.0)");
        assert_eq!(expr("m[1][2]"), "(index (index m 1.0) 2.0)");
        assert_eq!(expr("fs[0](x)"), "(call (index fs 0.0) x)");
        assert_eq!(expr("-a[0]"), "(- (index a 0.0))");
    }

    #[test]
    fn test_subscript_assignment_becomes_set() {
        assert_eq!(expr("a[0] = 1"), "(set a 0.0 1.0)");
        assert_eq!(expr("a[i] = b[j] = 2"), "(set a i (set b j 2.0))");
    }

    #[test]
    fn test_array_literals() {
        assert_eq!(expr("[1, \"two\", nil]"), "(array 1.0 two nil)");

        let empty = Parser::new(tokens("[]"))
            .parse_expression()
            .expect("expression should parse");

        assert!(matches!(empty, Expr::Array { ref elements, .. } if elements.is_empty()));
    }

    #[test]
    fn test_for_desugars_to_while() {
        assert_eq!(
            program("for (var i = 0; i < 3; i = i + 1) print i;"),
            vec!["(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"]
        );
        assert_eq!(program("for (;;) print 1;"), vec!["(while true (print 1.0))"]);
    }

    #[test]
    fn test_dangling_else_binds_to_nearest_if() {
        assert_eq!(
            program("if (a) if (b) print 1; else print 2;"),
            vec!["(if a (if b (print 1.0) (print 2.0)))"]
        );
    }

    #[test]
    fn test_declarations() {
        assert_eq!(
            program("var x; var y = 2; fun add(a, b) { return a + b; } function f() { return; }"),
            vec![
                "(var x)",
                "(var y 2.0)",
                "(fun add(a b) (return (+ a b)))",
                "(fun f() (return))",
            ]
        );
    }

    #[test]
    fn test_error_locations() {
        assert_eq!(
            errors("print 1"),
            vec!["[line 1] Error at end: Expect ';' after value."]
        );
        assert_eq!(
            errors("var 1 = 2;"),
            vec!["[line 1] Error at '1': Expect variable name."]
        );
    }

    #[test]
    fn test_recovery_reports_each_broken_statement() {
        assert_eq!(
            errors("print ;\nprint 1;\nvar x = ;"),
            vec![
                "[line 1] Error at ';': Expect expression.",
                "[line 3] Error at ';': Expect expression.",
            ]
        );
    }

    #[test]
    fn test_recovery_inside_block() {
        assert_eq!(
            errors("{\n  var = 1;\n  print 2;\n}\nprint ;"),
            vec![
                "[line 2] Error at '=': Expect variable name.",
                "[line 5] Error at ';': Expect expression.",
            ]
        );
    }

    #[test]
    fn test_invalid_assignment_target_is_not_fatal() {
        assert_eq!(
            errors("1 = 2; print 3; var;"),
            vec![
                "[line 1] Error at '=': Invalid assignment target.",
                "[line 1] Error at ';': Expect variable name.",
            ]
        );
        assert_eq!(
            errors("a + b = c;"),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
    }

    #[test]
    fn test_argument_limit() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source = format!("f({});", args.join(", "));

        let errs = errors(&source);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].ends_with("Can't have more than 255 arguments."));

        let ok: Vec<String> = (0..255).map(|i| i.to_string()).collect();
        assert!(parse(&format!("f({});", ok.join(", "))).is_ok());
    }

    #[test]
    fn test_parameter_limit() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun f({}) {{}}", params.join(", "));

        let errs = errors(&source);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].ends_with("Can't have more than 255 parameters."));
    }

    #[test]
    fn test_classes_are_reserved() {
        assert_eq!(
            errors("class Foo {}\nprint 1;"),
            vec!["[line 1] Error at 'class': Classes are not supported."]
        );
    }

    #[test]
    fn test_parse_expression_rejects_trailing_tokens() {
        let errs = Parser::new(tokens("1 2"))
            .parse_expression()
            .expect_err("trailing token");

        assert_eq!(
            errs[0].to_string(),
            "[line 1] Error at '2': Expect end of expression."
        );
    }

    #[test]
    fn test_missing_eof_is_supplied() {
        let toks = vec![
            Token::new(TokenType::PRINT, "print", 1),
            Token::new(TokenType::NUMBER(1.0), "1", 1),
            Token::new(TokenType::SEMICOLON, ";", 1),
        ];

        let statements = Parser::new(toks).parse().expect("should parse");
        assert_eq!(statements.len(), 1);

        assert!(Parser::new(Vec::new()).parse().expect("empty").is_empty());
    }

    #[test]
    fn test_ast_serializes_to_json() {
        let statements = parse("print [1][0];").expect("should parse");
        let json = serde_json::to_string(&statements).expect("serializable");

        assert!(json.contains("\"Print\""));
        assert!(json.contains("\"Subscript\""));
        assert!(json.contains("\"Array\""));
    }
}
