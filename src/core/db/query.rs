/// Query Module
///
/// Lazy row streaming. A [`RowCursor`] owns the prepared statement of a
/// select; each call to [`RowCursor::rows`] executes it and returns a
/// single-pass [`RowStream`] that borrows the cursor. Dropping either one
/// releases the statement.

use crate::core::db::connection::{Connection, Cursor};
use crate::core::db::value::{Row, Value};
use crate::core::{DriverResult, Result};

/// A prepared select bound to its column projection.
pub struct RowCursor<'c, C: Connection + 'c> {
    cursor: C::Cursor<'c>,
    columns: Vec<String>,
    params: Vec<Value>,
}

impl<'c, C: Connection + 'c> RowCursor<'c, C> {
    pub fn new(cursor: C::Cursor<'c>, columns: Vec<String>, params: Vec<Value>) -> Self {
        RowCursor {
            cursor,
            columns,
            params,
        }
    }

    /// Column names the values of every row line up with.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Executes the select and streams its rows in server order.
    ///
    /// Each call issues the query again; a stream cannot be rewound.
    pub fn rows<'r>(&'r mut self) -> Result<RowStream<<C::Cursor<'c> as Cursor>::Rows<'r>>> {
        let rows = self.cursor.query(&self.params)?;
        Ok(RowStream::new(rows))
    }

    /// Runs the select and collects every row.
    pub fn collect_rows(mut self) -> Result<Vec<Row>> {
        let rows = self.rows()?.collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }
}

/// A finite, single-pass sequence of rows. Stops after the first error.
pub struct RowStream<I> {
    inner: I,
    done: bool,
}

impl<I> RowStream<I>
where
    I: Iterator<Item = DriverResult<Row>>,
{
    pub fn new(inner: I) -> Self {
        RowStream { inner, done: false }
    }
}

impl<I> Iterator for RowStream<I>
where
    I: Iterator<Item = DriverResult<Row>>,
{
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.inner.next() {
            Some(Ok(row)) => Some(Ok(row)),
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e.into()))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl<I> std::iter::FusedIterator for RowStream<I> where I: Iterator<Item = DriverResult<Row>> {}
