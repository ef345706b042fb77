//! Compiler tests: source text in, VM code text out.

use pretty_assertions::assert_eq;

use crate::compile_to_string;
use crate::error::{CompileError, JackError, LexerError};

fn compile(source: &str) -> String {
    compile_to_string(source).unwrap()
}

/// Compile a single function body inside `class M`.
fn compile_fn(signature: &str, body: &str) -> String {
    compile(&format!("class M {{ {} {{ {} }} }}", signature, body))
}

fn lines(code: &str) -> Vec<&str> {
    code.lines().collect()
}

fn compile_err(source: &str) -> JackError {
    compile_to_string(source).unwrap_err()
}

#[test]
fn test_empty_main() {
    assert_eq!(
        compile("class Main { function void main() { return; } }"),
        "function Main.main 0\npush constant 0\nreturn\n"
    );
}

#[test]
fn test_let_with_addition() {
    assert_eq!(
        compile_fn("function void f()", "var int x; let x = 1 + 2; return;"),
        "function M.f 1\n\
         push constant 1\n\
         push constant 2\n\
         add\n\
         pop local 0\n\
         push constant 0\n\
         return\n"
    );
}

#[test]
fn test_multiply_is_library_call() {
    let code = compile_fn("function int f(int x, int y)", "return x * y;");
    assert_eq!(
        lines(&code),
        vec![
            "function M.f 0",
            "push argument 0",
            "push argument 1",
            "call Math.multiply 2",
            "return",
        ]
    );
}

#[test]
fn test_operators_have_no_precedence() {
    let code = compile_fn("function int f()", "return 1 + 2 * 3 / 4 - 5;");
    assert_eq!(
        lines(&code),
        vec![
            "function M.f 0",
            "push constant 1",
            "push constant 2",
            "add",
            "push constant 3",
            "call Math.multiply 2",
            "push constant 4",
            "call Math.divide 2",
            "push constant 5",
            "sub",
            "return",
        ]
    );
}

#[test]
fn test_relational_and_logical_operators() {
    let code = compile_fn(
        "function boolean f(int a, int b)",
        "return (a < b) | (a > b) & ~(a = b);",
    );
    assert_eq!(
        lines(&code),
        vec![
            "function M.f 0",
            "push argument 0",
            "push argument 1",
            "lt",
            "push argument 0",
            "push argument 1",
            "gt",
            "or",
            "push argument 0",
            "push argument 1",
            "eq",
            "not",
            "and",
            "return",
        ]
    );
}

#[test]
fn test_keyword_constants_and_unary() {
    let code = compile_fn(
        "function void f()",
        "var boolean b; var int n; var Array a; \
         let b = true; let b = ~false; let n = -5; let a = null; return;",
    );
    assert_eq!(
        lines(&code),
        vec![
            "function M.f 3",
            "push constant 0",
            "not",
            "pop local 0",
            "push constant 0",
            "not",
            "pop local 0",
            "push constant 5",
            "neg",
            "pop local 1",
            "push constant 0",
            "pop local 2",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_string_literal_rebuilt_per_character() {
    let code = compile_fn("function String f()", "return \"Hi!\";");
    assert_eq!(
        lines(&code),
        vec![
            "function M.f 0",
            "push constant 3",
            "call String.new 1",
            "push constant 72",
            "call String.appendChar 2",
            "push constant 105",
            "call String.appendChar 2",
            "push constant 33",
            "call String.appendChar 2",
            "return",
        ]
    );
}

#[test]
fn test_empty_string_literal() {
    let code = compile_fn("function String f()", "return \"\";");
    assert_eq!(
        lines(&code),
        vec!["function M.f 0", "push constant 0", "call String.new 1", "return"]
    );
}

#[test]
fn test_non_ascii_string_pushes_one_code_point_per_character() {
    let code = compile_fn("function String f()", "return \"né\";");
    assert_eq!(
        lines(&code),
        vec![
            "function M.f 0",
            "push constant 2",
            "call String.new 1",
            "push constant 110",
            "call String.appendChar 2",
            "push constant 233",
            "call String.appendChar 2",
            "return",
        ]
    );
}

#[test]
fn test_string_char_without_constant_encoding_is_rejected() {
    let err = compile_err("class M { function String f() { return \"😀\"; } }");
    assert!(matches!(
        err,
        JackError::Lexer(LexerError::InvalidStringChar('😀', _))
    ));
}

#[test]
fn test_overlong_string_is_rejected() {
    let source = format!(
        "class M {{ function String f() {{ return \"{}\"; }} }}",
        "a".repeat(65536)
    );
    assert!(matches!(
        compile_err(&source),
        JackError::Lexer(LexerError::StringTooLong { .. })
    ));
}

#[test]
fn test_method_reserves_argument_zero_for_receiver() {
    let code = compile("class C { method int get(int k) { return k; } }");
    assert_eq!(
        lines(&code),
        vec![
            "function C.get 0",
            "push argument 0",
            "pop pointer 0",
            "push argument 1",
            "return",
        ]
    );
}

#[test]
fn test_constructor_allocates_fields_then_binds_receiver() {
    let code = compile(
        "class P {
            field int x, y;
            static int count;
            constructor P new(int ax) {
                let x = ax;
                let count = count + 1;
                return this;
            }
        }",
    );
    assert_eq!(
        lines(&code),
        vec![
            "function P.new 0",
            "push constant 2",
            "call Memory.alloc 1",
            "pop pointer 0",
            "push argument 0",
            "pop this 0",
            "push static 0",
            "push constant 1",
            "add",
            "pop static 0",
            "push pointer 0",
            "return",
        ]
    );
}

#[test]
fn test_while_loop() {
    let code = compile_fn(
        "function void f()",
        "var int i; let i = 0; while (i < 3) { let i = i + 1; } return;",
    );
    assert_eq!(
        lines(&code),
        vec![
            "function M.f 1",
            "push constant 0",
            "pop local 0",
            "label M.L0",
            "push local 0",
            "push constant 3",
            "lt",
            "not",
            "if-goto M.L1",
            "push local 0",
            "push constant 1",
            "add",
            "pop local 0",
            "goto M.L0",
            "label M.L1",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_if_else() {
    let code = compile_fn(
        "function int f(boolean b)",
        "if (b) { return 1; } else { return 2; }",
    );
    assert_eq!(
        lines(&code),
        vec![
            "function M.f 0",
            "push argument 0",
            "not",
            "if-goto M.L0",
            "push constant 1",
            "return",
            "goto M.L1",
            "label M.L0",
            "push constant 2",
            "return",
            "label M.L1",
        ]
    );
}

#[test]
fn test_if_without_else_still_emits_both_labels() {
    let code = compile_fn("function void f(boolean b)", "if (b) { } return;");
    assert_eq!(
        lines(&code),
        vec![
            "function M.f 0",
            "push argument 0",
            "not",
            "if-goto M.L0",
            "goto M.L1",
            "label M.L0",
            "label M.L1",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_labels_are_unique_across_the_class() {
    let code = compile(
        "class M {
            function void f(boolean b) {
                while (b) { if (b) { let b = false; } }
                return;
            }
            function void g(boolean b) {
                if (b) { while (b) { let b = false; } } else { }
                return;
            }
        }",
    );
    let labels: Vec<&str> = code
        .lines()
        .filter_map(|l| l.strip_prefix("label "))
        .collect();
    assert_eq!(
        labels,
        vec!["M.L0", "M.L2", "M.L3", "M.L1", "M.L6", "M.L7", "M.L4", "M.L5"]
    );
    let mut sorted = labels.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), 8);
}

#[test]
fn test_do_calls_discard_result() {
    let code = compile(
        "class Game {
            field Ball ball;
            method void run() {
                var Point p;
                do Output.printInt(1);
                do p.draw(3, 4);
                do ball.move();
                do step();
                return;
            }
        }",
    );
    assert_eq!(
        lines(&code),
        vec![
            "function Game.run 1",
            "push argument 0",
            "pop pointer 0",
            "push constant 1",
            "call Output.printInt 1",
            "pop temp 0",
            "push local 0",
            "push constant 3",
            "push constant 4",
            "call Point.draw 3",
            "pop temp 0",
            "push this 0",
            "call Ball.move 1",
            "pop temp 0",
            "push pointer 0",
            "call Game.step 1",
            "pop temp 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_calls_inside_expressions() {
    let code = compile_fn(
        "function int f(Point p)",
        "return p.getX() + Math.max(1, p.getY());",
    );
    assert_eq!(
        lines(&code),
        vec![
            "function M.f 0",
            "push argument 0",
            "call Point.getX 1",
            "push constant 1",
            "push argument 0",
            "call Point.getY 1",
            "call Math.max 2",
            "add",
            "return",
        ]
    );
}

#[test]
fn test_constructor_call_has_no_implicit_argument() {
    let code = compile_fn(
        "function void f()",
        "var Point p; let p = Point.new(1, 2); return;",
    );
    assert_eq!(
        lines(&code),
        vec![
            "function M.f 1",
            "push constant 1",
            "push constant 2",
            "call Point.new 2",
            "pop local 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_array_read_and_write() {
    let code = compile_fn(
        "function void f(Array a, int i)",
        "let a[i] = a[i + 1]; return;",
    );
    assert_eq!(
        lines(&code),
        vec![
            "function M.f 0",
            "push argument 0",
            "push argument 1",
            "add",
            "push argument 0",
            "push argument 1",
            "push constant 1",
            "add",
            "add",
            "pop pointer 1",
            "push that 0",
            "pop temp 0",
            "pop pointer 1",
            "push temp 0",
            "pop that 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_redefined_name_resolves_to_latest_definition() {
    let code = compile_fn("function int f(int a)", "var int a; let a = 5; return a;");
    assert_eq!(
        lines(&code),
        vec![
            "function M.f 1",
            "push constant 5",
            "pop local 0",
            "push local 0",
            "return",
        ]
    );
}

#[test]
fn test_local_shadows_field() {
    let code = compile(
        "class M {
            field int size;
            method int f() { var int size; let size = 1; return size; }
            method int g() { return size; }
        }",
    );
    assert_eq!(
        lines(&code),
        vec![
            "function M.f 1",
            "push argument 0",
            "pop pointer 0",
            "push constant 1",
            "pop local 0",
            "push local 0",
            "return",
            "function M.g 0",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "return",
        ]
    );
}

#[test]
fn test_one_function_per_subroutine() {
    let code = compile(
        "class Shapes {
            field int w;
            constructor Shapes new() { return this; }
            method void dispose() { do Memory.deAlloc(this); return; }
            static int total;
            function int area(int a, int b) { return a * b; }
        }",
    );
    let functions: Vec<&str> = code.lines().filter(|l| l.starts_with("function ")).collect();
    assert_eq!(
        functions,
        vec![
            "function Shapes.new 0",
            "function Shapes.dispose 0",
            "function Shapes.area 0",
        ]
    );
}

#[test]
fn test_recompiling_is_byte_identical() {
    let source = "class M {
        function void f(boolean b) { while (b) { let b = false; } return; }
        function void g(boolean b) { if (b) { } return; }
    }";
    assert_eq!(compile(source), compile(source));
    assert!(compile(source).contains("label M.L0\n"));
}

#[test]
fn test_comments_are_ignored() {
    let code = compile(
        "/** Entry point. */
        class Main {
            // nothing here
            function void main() { /* inline */ return; } // trailing
        }",
    );
    assert_eq!(code, "function Main.main 0\npush constant 0\nreturn\n");
}

#[test]
fn test_field_declared_after_use_is_not_visible() {
    let err = compile_err(
        "class A {
            method void f() { let x = 1; return; }
            field int x;
        }",
    );
    match err {
        JackError::Compile(CompileError::UndefinedVariable { name, span }) => {
            assert_eq!(name, "x");
            assert_eq!(span.line, 2);
        }
        other => panic!("Expected undefined variable, got {:?}", other),
    }
}

#[test]
fn test_undefined_array_base_and_read() {
    let read = compile_err("class M { function int f() { return missing; } }");
    assert!(matches!(
        read,
        JackError::Compile(CompileError::UndefinedVariable { ref name, .. }) if name == "missing"
    ));

    let base = compile_err("class M { function int f() { return buf[0]; } }");
    assert!(matches!(
        base,
        JackError::Compile(CompileError::UndefinedVariable { ref name, .. }) if name == "buf"
    ));
}

#[test]
fn test_unknown_receiver_is_a_class_call_not_an_error() {
    let code = compile_fn("function void f()", "do Missing.run(); return;");
    assert!(code.contains("call Missing.run 0\n"));
}

#[test]
fn test_local_count_beyond_sixteen_bits_is_rejected() {
    let names: Vec<String> = (0..=u16::MAX as u32).map(|i| format!("v{}", i)).collect();
    let source = format!(
        "class M {{ function void f() {{ var int {}; return; }} }}",
        names.join(", ")
    );
    match compile_err(&source) {
        JackError::Compile(CompileError::LimitExceeded { what, .. }) => {
            assert_eq!(what, "local variables");
        }
        other => panic!("Expected limit exceeded, got {:?}", other),
    }
}

#[test]
fn test_argument_count_beyond_sixteen_bits_is_rejected() {
    let args = vec!["0"; u16::MAX as usize].join(",");
    let source = format!("class M {{ method void f() {{ do g({}); return; }} }}", args);
    match compile_err(&source) {
        JackError::Compile(CompileError::LimitExceeded { what, .. }) => {
            assert_eq!(what, "call arguments");
        }
        other => panic!("Expected limit exceeded, got {:?}", other),
    }
}

#[test]
fn test_missing_semicolon_is_syntax_error() {
    let err = compile_err("class M { function void f() { var int x; let x = 1 } }");
    match err {
        JackError::Compile(CompileError::Syntax { expected, found, span }) => {
            assert_eq!(expected, "';'");
            assert_eq!(found, "}");
            assert_eq!(span.line, 1);
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_wrong_token_class_is_type_mismatch() {
    let err = compile_err("class 5 { }");
    assert!(matches!(
        err,
        JackError::Compile(CompileError::TokenTypeMismatch { .. })
    ));
}

#[test]
fn test_truncated_input_is_unexpected_eof() {
    let err = compile_err("class M { function void f() { return;");
    assert!(matches!(
        err,
        JackError::Compile(CompileError::UnexpectedEof(_))
    ));
}

#[test]
fn test_tokens_after_class_are_rejected() {
    let err = compile_err("class M { } class N { }");
    assert!(matches!(
        err,
        JackError::Compile(CompileError::Syntax { ref expected, .. }) if expected == "end of file"
    ));
}

#[test]
fn test_lexer_errors_abort_compilation() {
    let err = compile_err("class M { function void f() { do Output.printString(\"oops); return; } }");
    assert!(matches!(
        err,
        JackError::Lexer(LexerError::UnterminatedString(_))
    ));
}

#[test]
fn test_statement_keyword_in_term_position() {
    let err = compile_err("class M { function int f() { return let; } }");
    assert!(matches!(
        err,
        JackError::Compile(CompileError::Syntax { ref expected, .. }) if expected == "term"
    ));
}
