//! Extraction properties over generated records.

use std::collections::HashMap;

use proptest::prelude::*;
use telemetry_codegen::decl::{Declaration, DeclarationLoader, DocTable, Member, ModuleDocs, Shape};
use telemetry_codegen::docs::DocCommentResolver;
use telemetry_codegen::extract::Extractor;
use telemetry_codegen::ir::{QualifiedName, RecordSchema};
use telemetry_codegen::{ExtractError, LoadError, ValidationErrorKind};

/// Records held in memory; every field is documented.
#[derive(Default)]
struct Records(HashMap<QualifiedName, Vec<Member>>);

impl DeclarationLoader for Records {
    fn load(&self, name: &QualifiedName) -> Result<Declaration, LoadError> {
        self.0
            .get(name)
            .map(|members| Declaration::Struct { members: members.clone() })
            .ok_or_else(|| LoadError::TypeNotFound(name.clone()))
    }
}

impl ModuleDocs for Records {
    fn module_docs(&self, module: &str) -> Result<DocTable, LoadError> {
        Ok(self
            .0
            .iter()
            .filter(|(record, _)| record.module == module)
            .flat_map(|(record, members)| {
                members.iter().map(move |m| ((record.name.clone(), m.name.clone()), format!("{} docs.", m.name)))
            })
            .collect())
    }
}

fn root() -> QualifiedName {
    QualifiedName::parse("crate::Root")
}

fn child() -> QualifiedName {
    QualifiedName::parse("crate::inner::Child")
}

fn scalar(name: &str, ty: &str) -> Member {
    Member::new(name, Shape::Scalar(ty.to_string()))
}

/// `Root` holds the first `split` names, then embeds `Child` holding the rest.
fn records(names: &[String], types: &[&'static str], split: usize) -> Records {
    let split = split.min(names.len());
    let members = |range: std::ops::Range<usize>| -> Vec<Member> {
        range.map(|i| scalar(&names[i], types[i % types.len()])).collect()
    };
    let mut root_members = members(0..split);
    root_members.push(Member::new("Child", Shape::Record(child())).embedded());

    let mut records = Records::default();
    records.0.insert(root(), root_members);
    records.0.insert(child(), members(split..names.len()));
    records
}

fn extract(records: &Records) -> Result<RecordSchema, ExtractError> {
    let docs = DocCommentResolver::new(records);
    Extractor::new(records, &docs).extract(&root())
}

fn field_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z][a-z0-9_]{0,7}", 1..12).prop_map(|set| set.into_iter().collect())
}

fn field_types() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(vec!["String", "i64", "f64", "bool"]), 1..4)
}

proptest! {
    #[test]
    fn leaves_follow_declaration_order(names in field_names(), types in field_types(), split in 0usize..12) {
        let schema = extract(&records(&names, &types, split)).unwrap();
        let leaves: Vec<String> = schema.leaves().iter().map(|f| f.name.clone()).collect();
        prop_assert_eq!(leaves, names);
    }

    #[test]
    fn extraction_is_idempotent(names in field_names(), types in field_types(), split in 0usize..12) {
        let records = records(&names, &types, split);
        prop_assert_eq!(extract(&records).unwrap(), extract(&records).unwrap());
    }

    #[test]
    fn any_repeated_name_is_rejected(
        names in field_names(),
        types in field_types(),
        split in 0usize..12,
        pick in any::<prop::sample::Index>(),
    ) {
        let mut names = names;
        let repeated = names[pick.index(names.len())].clone();
        names.push(repeated.clone());

        let Err(ExtractError::Validation(err)) = extract(&records(&names, &types, split)) else {
            panic!("duplicate {repeated} was accepted");
        };
        let root_cause = err.root();
        prop_assert_eq!(&root_cause.field_name, &repeated);
        let is_duplicate = matches!(root_cause.kind, ValidationErrorKind::Duplicate { .. });
        prop_assert!(is_duplicate, "{}", err);
    }
}
