use crate::error::{ExecuteError, PrepareError};
use crate::row::Row;
use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

impl Statement {
    /// Parses a trimmed input line. Tokens are separated by spaces; tokens
    /// after the email of an insert are ignored.
    pub fn prepare(input: &str) -> Result<Self, PrepareError> {
        let mut tokens = input.split(' ').filter(|token| !token.is_empty());
        match tokens.next() {
            Some("insert") => Self::prepare_insert(tokens),
            Some("select") if input == "select" => Ok(Statement::Select),
            _ => Err(PrepareError::UnrecognizedStatement(input.to_string())),
        }
    }

    fn prepare_insert<'a>(mut args: impl Iterator<Item = &'a str>) -> Result<Self, PrepareError> {
        let (Some(id), Some(username), Some(email)) = (args.next(), args.next(), args.next())
        else {
            return Err(PrepareError::SyntaxError);
        };

        if let Some(digits) = id.strip_prefix('-') {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(PrepareError::NegativeId);
            }
        }
        let id: u32 = id.parse().map_err(|_| PrepareError::SyntaxError)?;

        Ok(Statement::Insert(Row::new(id, username, email)?))
    }

    pub fn execute(&self, table: &mut Table) -> Result<Vec<Row>, ExecuteError> {
        match self {
            Statement::Insert(row) => {
                table.insert(row)?;
                Ok(Vec::new())
            }
            Statement::Select => Ok(table.select()?),
        }
    }
}
