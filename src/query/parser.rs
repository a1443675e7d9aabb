// SQL inspector
// This module reads generated SQL back with a real grammar and reports its shape
// We use the sqlparser crate (PostgreSQL dialect, which understands $n placeholders)

use crate::error::{DataError, Result};
use serde::Serialize;
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};

/// The structural facts about one SQL statement
///
/// Clause positions are indexes into the statement's significant tokens
/// (whitespace and comments skipped), so they can be compared with each
/// other to check clause order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryShape {
    /// Placeholder ordinals in the order they appear in the text
    pub placeholders: Vec<usize>,
    /// Number of WHERE keywords
    pub where_count: usize,
    /// Number of AND keywords
    pub and_count: usize,
    pub where_at: Option<usize>,
    pub group_by_at: Option<usize>,
    pub having_at: Option<usize>,
    pub order_by_at: Option<usize>,
    pub limit_at: Option<usize>,
    /// True for SELECT statements, false for INSERT/UPDATE/...
    pub is_select: bool,
}

impl QueryShape {
    /// Highest placeholder ordinal referenced, 0 when there are none
    pub fn max_placeholder(&self) -> usize {
        self.placeholders.iter().copied().max().unwrap_or(0)
    }

    /// Ordinal of the placeholder that appears last in the text
    pub fn last_placeholder(&self) -> Option<usize> {
        self.placeholders.last().copied()
    }
}

/// The query inspector
pub struct QueryParser;

impl QueryParser {
    /// Tokenize and parse a single statement, then collect its shape
    pub fn inspect(sql: &str) -> Result<QueryShape> {
        let dialect = PostgreSqlDialect {};

        // Full parse first: a query that does not parse has no meaningful shape
        let ast = Parser::parse_sql(&dialect, sql)
            .map_err(|e| DataError::Sql(format!("SQL parsing error: {}", e)))?;

        if ast.len() != 1 {
            return Err(DataError::Sql(format!(
                "Expected a single statement, found {}",
                ast.len()
            )));
        }

        let tokens = Tokenizer::new(&dialect, sql)
            .tokenize()
            .map_err(|e| DataError::Sql(format!("SQL tokenizing error: {}", e)))?;

        let mut shape = QueryShape {
            is_select: matches!(ast[0], Statement::Query(_)),
            ..QueryShape::default()
        };

        let significant: Vec<&Token> = tokens
            .iter()
            .filter(|t| !matches!(t, Token::Whitespace(_)))
            .collect();

        for (pos, token) in significant.iter().enumerate() {
            match token {
                Token::Placeholder(name) => {
                    shape.placeholders.push(Self::parse_placeholder(name)?);
                }
                Token::Word(word) if word.quote_style.is_none() => {
                    // GROUP and ORDER only count when followed by BY
                    let next_is_by = matches!(
                        significant.get(pos + 1),
                        Some(Token::Word(next)) if next.keyword == Keyword::BY
                    );
                    match word.keyword {
                        Keyword::WHERE => {
                            shape.where_count += 1;
                            shape.where_at.get_or_insert(pos);
                        }
                        Keyword::AND => shape.and_count += 1,
                        Keyword::GROUP if next_is_by => {
                            shape.group_by_at.get_or_insert(pos);
                        }
                        Keyword::ORDER if next_is_by => {
                            shape.order_by_at.get_or_insert(pos);
                        }
                        Keyword::HAVING => {
                            shape.having_at.get_or_insert(pos);
                        }
                        Keyword::LIMIT => {
                            shape.limit_at.get_or_insert(pos);
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        Ok(shape)
    }

    /// Helper: turn "$3" into 3
    fn parse_placeholder(name: &str) -> Result<usize> {
        name.strip_prefix('$')
            .and_then(|digits| digits.parse::<usize>().ok())
            .filter(|ordinal| *ordinal > 0)
            .ok_or_else(|| {
                DataError::Placeholder(format!("'{}' is not a positional placeholder", name))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_clause_positions_in_order() {
        let shape = QueryParser::inspect(
            "SELECT properties.*, avg(property_reviews.rating) AS average_rating \
             FROM properties JOIN property_reviews ON properties.id = property_reviews.property_id \
             WHERE city LIKE $1 AND cost_per_night >= $2 \
             GROUP BY properties.id HAVING avg(property_reviews.rating) >= $3 \
             ORDER BY cost_per_night LIMIT $4",
        )
        .unwrap();

        assert!(shape.is_select);
        assert_eq!(shape.placeholders, vec![1, 2, 3, 4]);
        assert_eq!(shape.where_count, 1);
        assert_eq!(shape.and_count, 1);
        let group_by = shape.group_by_at.unwrap();
        let having = shape.having_at.unwrap();
        let order_by = shape.order_by_at.unwrap();
        let limit = shape.limit_at.unwrap();
        assert!(shape.where_at.unwrap() < group_by);
        assert!(group_by < having && having < order_by && order_by < limit);
        assert_eq!(shape.last_placeholder(), Some(4));
    }

    #[test]
    fn rejects_dangling_and() {
        let err = QueryParser::inspect("SELECT * FROM properties AND owner_id = $1").unwrap_err();
        assert!(matches!(err, DataError::Sql(_)));
    }

    #[test]
    fn rejects_multiple_statements() {
        let err = QueryParser::inspect("SELECT 1; SELECT 2").unwrap_err();
        assert!(matches!(err, DataError::Sql(_)));
    }

    #[test]
    fn insert_is_not_a_select() {
        let shape = QueryParser::inspect(
            "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING *",
        )
        .unwrap();
        assert!(!shape.is_select);
        assert_eq!(shape.max_placeholder(), 3);
        assert_eq!(shape.where_count, 0);
    }

    #[test]
    fn quoted_identifiers_are_not_keywords() {
        let shape = QueryParser::inspect(r#"SELECT "where" FROM t LIMIT $1"#).unwrap();
        assert_eq!(shape.where_count, 0);
        assert_eq!(shape.placeholders, vec![1]);
    }
}
