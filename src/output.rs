use crate::model::Category;

pub struct Styler {
    color_enabled: bool,
}

impl Styler {
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    fn wrap(&self, code: &str, s: &str) -> String {
        if !self.color_enabled {
            return s.to_string();
        }
        format!("{}{}\u{001b}[0m", code, s)
    }

    pub fn green(&self, s: &str) -> String {
        self.wrap("\u{001b}[32m", s)
    }

    pub fn gray(&self, s: &str) -> String {
        self.wrap("\u{001b}[90m", s)
    }

    pub fn yellow(&self, s: &str) -> String {
        self.wrap("\u{001b}[33m", s)
    }

    /// The original app's category palette, mapped onto ANSI colors.
    pub fn category(&self, category: Category, s: &str) -> String {
        let code = match category {
            Category::Health => "\u{001b}[31m",
            Category::Productivity => "\u{001b}[34m",
            Category::Learning => "\u{001b}[35m",
            Category::Social => "\u{001b}[33m",
            Category::Creativity => "\u{001b}[32m",
        };
        self.wrap(code, s)
    }
}

fn pad_right(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        let mut out = String::with_capacity(s.len() + (width - len));
        out.push_str(s);
        out.push_str(&" ".repeat(width - len));
        out
    }
}

/// Two-space column layout; all emitted cells are plain ASCII, so character
/// count is the column width.
pub fn render_simple_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();

    for row in rows.iter() {
        for (i, cell) in row.iter().enumerate() {
            let cell_width = cell.chars().count();
            if i >= widths.len() {
                widths.push(cell_width);
            } else {
                widths[i] = widths[i].max(cell_width);
            }
        }
    }

    let mut lines: Vec<String> = Vec::with_capacity(rows.len() + 1);
    lines.push(
        headers
            .iter()
            .enumerate()
            .map(|(i, h)| pad_right(h, widths[i]))
            .collect::<Vec<String>>()
            .join("  "),
    );
    for row in rows.iter() {
        lines.push(
            row.iter()
                .enumerate()
                .map(|(i, cell)| pad_right(cell, widths[i]))
                .collect::<Vec<String>>()
                .join("  "),
        );
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styler_off_passes_through() {
        let plain = Styler::new(false);
        assert_eq!(plain.green("ok"), "ok");
        assert_eq!(plain.category(Category::Health, "health"), "health");
    }

    #[test]
    fn styler_on_wraps_and_resets() {
        let styled = Styler::new(true);
        let s = styled.category(Category::Productivity, "productivity");
        assert!(s.starts_with("\u{001b}[34m"));
        assert!(s.ends_with("\u{001b}[0m"));
    }

    #[test]
    fn columns_align_on_widest_cell() {
        let table = render_simple_table(
            &["id", "name"],
            &[
                vec!["h0001".to_string(), "Read".to_string()],
                vec!["h0002".to_string(), "Stretch".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "id     name");
        assert_eq!(lines[1], "h0001  Read");
        assert_eq!(lines[2], "h0002  Stretch");
    }

    #[test]
    fn headers_only_when_no_rows() {
        assert_eq!(render_simple_table(&["a", "b"], &[]), "a  b");
    }
}
