// Column roles derived from column-name suffixes
//
//   _num, _num2f, _pct, _unit, _err  metric (right aligned)
//   _label                           free-form label
//   _group                           splits a table into titled sub-tables
//   anything else                    dimension

/// Role of a column, decided by the last `_`-separated word of its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Metric,
    Label,
    Group,
    Dimension,
}

impl ColumnKind {
    pub fn of(name: &str) -> Self {
        match suffix(name) {
            "num" | "num2f" | "pct" | "unit" | "err" => ColumnKind::Metric,
            "label" => ColumnKind::Label,
            "group" => ColumnKind::Group,
            _ => ColumnKind::Dimension,
        }
    }

    pub fn alignment(self) -> Alignment {
        if self == ColumnKind::Metric {
            Alignment::Right
        } else {
            Alignment::Left
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

/// Last `_`-separated word of a column name
pub fn suffix(name: &str) -> &str {
    name.rsplit('_').next().unwrap_or(name)
}

/// Display header for a column name
///
/// One trailing role suffix is dropped, except `_err` which stays visible so
/// error columns are told apart from their value column.
///
/// # Example
/// ```
/// use benchdiff::report::label_from_name;
///
/// assert_eq!(label_from_name("diff_pct_label"), "Diff Pct");
/// assert_eq!(label_from_name("left_mean_err"), "Left Mean Err");
/// assert_eq!(label_from_name("unit_group"), "Unit");
/// ```
pub fn label_from_name(name: &str) -> String {
    let mut words: Vec<&str> = name.split('_').collect();
    if words.len() > 1
        && matches!(
            words.last().copied(),
            Some("num" | "num2f" | "pct" | "group" | "unit" | "label" | "pivot")
        )
    {
        words.pop();
    }
    words
        .iter()
        .map(|word| capitalize(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
