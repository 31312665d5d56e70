pub(crate) const DASH: char = '-';
pub(crate) const EQUALS: char = '=';
pub(crate) const CSV_SEPARATOR: char = ',';
pub(crate) const ENV_SEPARATOR: char = '_';
