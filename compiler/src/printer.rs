use std::collections::HashMap;

/// Substitution variables for [`Printer::print`].  Emitters thread one map
/// through recursive calls, overwriting keys as the context changes.
pub type Vars = HashMap<String, String>;

/// Inserts `pairs` into `vars`, replacing existing entries.
pub fn set_vars(vars: &mut Vars, pairs: &[(&str, &str)]) {
    for (key, value) in pairs {
        vars.insert((*key).to_string(), (*value).to_string());
    }
}

/// A token-substituting text sink.  Variables are referenced in template
/// text between a pair of delimiter characters (`$name$` with a `'$'`
/// delimiter); a doubled delimiter emits the delimiter itself.  The
/// delimiter is chosen per artifact so that literal text never collides
/// with the substitution syntax.
///
/// Indentation is two spaces per level and is applied at the start of every
/// non-empty line.
pub struct Printer {
    buffer:        String,
    delim:         char,
    indent:        usize,
    at_line_start: bool,
}

impl Printer {
    pub fn new(delim: char) -> Self {
        Printer {
            buffer:        String::new(),
            delim,
            indent:        0,
            at_line_start: true,
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn outdent(&mut self) {
        if self.indent > 0 {
            self.indent -= 1;
        }
    }

    /// Emit `text`, replacing each `<delim>name<delim>` token with the
    /// matching entry from `vars`.
    ///
    /// Panics on a reference to an undefined variable or an unterminated
    /// token; both are emitter bugs, not input errors.
    pub fn print(&mut self, vars: &Vars, text: &str) {
        let mut chars = text.chars();

        while let Some(c) = chars.next() {
            if c != self.delim {
                self.emit_char(c);
                continue;
            }

            let mut name = String::new();
            loop {
                match chars.next() {
                    Some(c) if c == self.delim => break,
                    Some(c) => name.push(c),
                    None => panic!("unterminated substitution token in template: {:?}", text),
                }
            }

            if name.is_empty() {
                self.emit_char(self.delim);
            } else {
                let value = vars
                    .get(&name)
                    .unwrap_or_else(|| panic!("undefined template variable \"{}\"", name));
                self.emit_str(value);
            }
        }
    }

    pub fn print_pairs(&mut self, pairs: &[(&str, &str)], text: &str) {
        let mut vars = Vars::new();
        set_vars(&mut vars, pairs);
        self.print(&vars, text);
    }

    /// Emit static template text (no substitution tokens).
    pub fn write(&mut self, text: &str) {
        self.print(&Vars::new(), text);
    }

    fn emit_str(&mut self, text: &str) {
        for c in text.chars() {
            self.emit_char(c);
        }
    }

    fn emit_char(&mut self, c: char) {
        if c == '\n' {
            self.buffer.push('\n');
            self.at_line_start = true;
            return;
        }
        if self.at_line_start {
            for _ in 0..self.indent {
                self.buffer.push_str("  ");
            }
            self.at_line_start = false;
        }
        self.buffer.push(c);
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_variables() {
        let mut printer = Printer::new('$');
        printer.print_pairs(&[("name", "points")], "void\nclear_$name$(svTHIS)\n");
        assert_eq!(printer.as_str(), "void\nclear_points(svTHIS)\n");
    }

    #[test]
    fn test_doubled_delimiter_is_literal() {
        let mut printer = Printer::new('*');
        printer.write("a ** b\n");
        assert_eq!(printer.as_str(), "a * b\n");
    }

    #[test]
    fn test_indentation_applies_per_line() {
        let mut printer = Printer::new('$');
        printer.write("{\n");
        printer.indent();
        printer.write("x;\ny;\n");
        printer.outdent();
        printer.write("}\n");
        assert_eq!(printer.as_str(), "{\n  x;\n  y;\n}\n");
    }

    #[test]
    #[should_panic(expected = "undefined template variable")]
    fn test_undefined_variable_panics() {
        let mut printer = Printer::new('$');
        printer.write("$missing$");
    }
}
