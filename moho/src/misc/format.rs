use std::fmt::Display;
use itertools::Itertools;

const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// `superscript(-12) == "⁻¹²"`
pub fn superscript(i: isize) -> String {
    let sign = if i < 0 { "⁻" } else { "" };
    let digits = i.unsigned_abs().to_string().chars().map(|c|
        SUPERSCRIPT_DIGITS[c as usize - '0' as usize]
    ).collect::<String>();
    format!("{sign}{digits}")
}

/// Renders a borderless table with `rows` down the left and `cols` across
/// the top, the corner cell being `head`.
pub fn table<S, I, J, I1, I2, D, F>(head: S, rows: I1, cols: I2, entry: F) -> String
where
    S: Display,
    I: Display,
    J: Display,
    I1: Iterator<Item = I>,
    I2: Iterator<Item = J>,
    D: Display,
    F: Fn(&I, &J) -> D
{
    use prettytable::{format::consts::FORMAT_CLEAN, Cell, Row, Table};

    let cols = cols.collect_vec();
    let line = |first: String, rest: Vec<String>| -> Row {
        Row::new(std::iter::once(first).chain(rest).map(|s| Cell::new(&s)).collect())
    };

    let mut t = Table::new();
    t.set_format(*FORMAT_CLEAN);
    t.set_titles(line(head.to_string(), cols.iter().map(|j| j.to_string()).collect()));

    for i in rows {
        let cells = cols.iter().map(|j| entry(&i, j).to_string()).collect();
        t.add_row(line(i.to_string(), cells));
    }

    t.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superscripts() {
        assert_eq!(superscript(0), "⁰");
        assert_eq!(superscript(4), "⁴");
        assert_eq!(superscript(-12), "⁻¹²");
    }

    #[test]
    fn stats_like_table() {
        let t = table("d", 1..=2, ["gens", "nodes"].into_iter(), |&d, &c| if c == "gens" { d * 3 } else { d });
        let lines = t.lines().collect_vec();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("gens") && lines[0].contains("nodes"));
        assert!(lines[2].contains('6'));
    }
}
