//! Record validation and schema extraction.
//!
//! Walks a record's members in declaration order, checks every member against
//! the structural rules, descends into embedded records and builds the
//! [`RecordSchema`] both renderers consume.
//!
//! Rules per member:
//! - records must be embedded, exported and be structs themselves;
//! - basic types must be one of `bool, float64, int64, string`, exported,
//!   not embedded, and documented;
//! - lists follow the basic-type rules for their element;
//! - names are unique across the whole flattened tree.
//!
//! The first violation aborts the walk.

use indexmap::IndexMap;
use tracing::debug;

use crate::decl::{Declaration, DeclarationLoader, Member, Shape};
use crate::docs::DocLookup;
use crate::error::{DocError, ExtractError, LoadError, ValidationError, ValidationErrorKind};
use crate::ir::{Field, QualifiedName, RecordSchema, ScalarKind};

pub struct Extractor<L, D> {
    loader: L,
    docs: D,
}

impl<L: DeclarationLoader, D: DocLookup> Extractor<L, D> {
    pub fn new(loader: L, docs: D) -> Self {
        Self { loader, docs }
    }

    /// Extract the schema of `target`, which must resolve to a struct.
    pub fn extract(&self, target: &QualifiedName) -> Result<RecordSchema, ExtractError> {
        let members = match self.loader.load(target)? {
            Declaration::Struct { members } => members,
            Declaration::Other { description } => {
                return Err(LoadError::NotAStruct { name: target.clone(), found: description }.into());
            }
        };

        let mut walk = Walk { extractor: self, owners: IndexMap::new(), path: vec![target.clone()] };
        let fields = walk.record(target, &members)?;
        debug!(record = %target, fields = fields.len(), names = walk.owners.len(), "extracted record");

        Ok(RecordSchema { record: target.clone(), fields })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// One depth-first traversal. `owners` maps every name seen so far to the
/// record that introduced it; `path` holds the records being descended into.
struct Walk<'a, L, D> {
    extractor: &'a Extractor<L, D>,
    owners: IndexMap<String, QualifiedName>,
    path: Vec<QualifiedName>,
}

impl<L: DeclarationLoader, D: DocLookup> Walk<'_, L, D> {
    fn record(&mut self, record: &QualifiedName, members: &[Member]) -> Result<Vec<Field>, ExtractError> {
        let mut fields = Vec::with_capacity(members.len());

        for member in members {
            let field = self.member(record, member)?;

            if let Some(owner) = self.owners.get(&member.name) {
                return Err(invalid(record, member, ValidationErrorKind::Duplicate { owner: owner.clone() }));
            }
            self.owners.insert(member.name.clone(), record.clone());

            fields.push(field);
        }

        Ok(fields)
    }

    fn member(&mut self, record: &QualifiedName, member: &Member) -> Result<Field, ExtractError> {
        match &member.shape {
            Shape::Record(target) => self.embedded(record, member, target),
            Shape::Scalar(ty) => {
                if member.embedded {
                    return Err(invalid(record, member, ValidationErrorKind::EmbeddedBasicType));
                }
                if !member.exported {
                    return Err(invalid(record, member, ValidationErrorKind::NotExported));
                }
                let Some(kind) = ScalarKind::from_declared(ty) else {
                    return Err(unsupported(record, member));
                };
                let doc = self.doc(record, member)?;
                debug!(record = %record, field = %member.name, %kind, "scalar field");
                Ok(Field::scalar(&member.name, kind, doc))
            }
            Shape::List(elem) => {
                if member.embedded {
                    return Err(invalid(record, member, ValidationErrorKind::EmbeddedBasicType));
                }
                if !member.exported {
                    return Err(invalid(record, member, ValidationErrorKind::NotExported));
                }
                let Some(kind) = ScalarKind::from_declared(elem) else {
                    return Err(unsupported(record, member));
                };
                let doc = self.doc(record, member)?;
                debug!(record = %record, field = %member.name, %kind, "list field");
                Ok(Field::list(&member.name, kind, doc))
            }
            Shape::Other(_) => Err(unsupported(record, member)),
        }
    }

    fn embedded(
        &mut self,
        record: &QualifiedName,
        member: &Member,
        target: &QualifiedName,
    ) -> Result<Field, ExtractError> {
        if !member.embedded {
            return Err(invalid(record, member, ValidationErrorKind::NotEmbedded));
        }
        if self.path.contains(target) {
            return Err(invalid(record, member, ValidationErrorKind::RecursiveEmbedding { record: target.clone() }));
        }

        let members = match self.extractor.loader.load(target)? {
            Declaration::Struct { members } => members,
            Declaration::Other { description } => {
                return Err(invalid(record, member, ValidationErrorKind::NotAStruct { found: description }));
            }
        };

        if !member.exported {
            return Err(invalid(record, member, ValidationErrorKind::NotExported));
        }

        debug!(record = %record, field = %member.name, embedded = %target, "descending into embedded record");
        self.path.push(target.clone());
        let children = self.record(target, &members);
        self.path.pop();
        let children = children.map_err(|err| match err {
            ExtractError::Validation(inner) => {
                invalid(record, member, ValidationErrorKind::Nested(Box::new(inner)))
            }
            other => other,
        })?;

        Ok(Field::embedded(&member.name, target.clone(), children))
    }

    fn doc(&self, record: &QualifiedName, member: &Member) -> Result<String, ExtractError> {
        self.extractor.docs.resolve(record, &member.name).map_err(|err| match err {
            DocError::Module { source, .. } => ExtractError::Load(source),
            doc => invalid(record, member, ValidationErrorKind::Doc(doc)),
        })
    }
}

fn invalid(record: &QualifiedName, member: &Member, kind: ValidationErrorKind) -> ExtractError {
    ValidationError::new(record, &member.name, kind).into()
}

fn unsupported(record: &QualifiedName, member: &Member) -> ExtractError {
    invalid(
        record,
        member,
        ValidationErrorKind::UnsupportedType {
            allowed: ScalarKind::supported_list(),
            found: member.type_description(),
        },
    )
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
