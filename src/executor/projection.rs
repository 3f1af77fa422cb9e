//! Projection

use crate::document::Document;
use crate::planner::ProjectedField;

use super::errors::ExecutorResult;
use super::filters::evaluate;
use super::operator::Operator;

/// Rewrites each document into the projected fields, in projection order
pub struct ProjectionOperator<O> {
    input: O,
    fields: Vec<ProjectedField>,
}

impl<O: Operator> ProjectionOperator<O> {
    pub fn new(input: O, fields: Vec<ProjectedField>) -> Self {
        Self { input, fields }
    }

    fn project(&self, doc: &Document) -> ExecutorResult<Document> {
        let mut out = Document::with_capacity(self.fields.len());
        for field in &self.fields {
            match field {
                ProjectedField::Wildcard => {
                    for (name, value) in doc.iter() {
                        out.set(name, value.clone());
                    }
                }
                ProjectedField::Named { name, expr } => {
                    out.set(name.clone(), evaluate(expr, doc)?);
                }
            }
        }
        Ok(out)
    }
}

impl<O: Operator> Operator for ProjectionOperator<O> {
    fn next(&mut self) -> ExecutorResult<Option<Document>> {
        match self.input.next()? {
            Some(doc) => Ok(Some(self.project(&doc)?)),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        self.input.close();
    }
}
