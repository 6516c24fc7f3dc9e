//! Rust source front end.
//!
//! Reads record declarations straight from a crate's source tree with `syn`.
//! Module paths are crate-rooted (`crate`, `crate::telemetry`) and resolve the
//! way rustc resolves them: inline `mod name { .. }` first, then `name.rs`,
//! then `name/mod.rs`.
//!
//! Items and fields behind a `cfg` that does not hold for the configured
//! feature set are invisible, as are `cfg(test)` items.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use quote::ToTokens;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Fields, GenericArgument, Item, Lit, Meta, PathArguments, Token, Type, UseTree};
use tracing::debug;

use crate::decl::{Declaration, DeclarationLoader, DocTable, Member, ModuleDocs, Shape};
use crate::error::LoadError;
use crate::ir::QualifiedName;

/// Attribute marking a field as embedded: `#[telemetry(embed)]`.
pub const ATTRIBUTE: &str = "telemetry";

const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "String", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32",
    "u64", "u128", "usize", "f32", "f64",
];

#[derive(Debug, Clone)]
pub struct RustSource {
    root: PathBuf,
    features: BTreeSet<String>,
}

/// The items of one module plus the file they were read from.
struct ParsedModule {
    module: String,
    file: PathBuf,
    items: Vec<Item>,
}

impl RustSource {
    /// `root` is the directory holding `lib.rs` or `main.rs`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), features: BTreeSet::new() }
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features.extend(features.into_iter().map(Into::into));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn module(&self, module: &str) -> Result<ParsedModule, LoadError> {
        let not_found = || LoadError::ModuleNotFound { module: module.to_string(), root: self.root.clone() };

        let mut segments = module.split("::");
        if segments.next() != Some(QualifiedName::CRATE_ROOT) {
            return Err(not_found());
        }

        let mut file = ["lib.rs", "main.rs"]
            .iter()
            .map(|name| self.root.join(name))
            .find(|path| path.is_file())
            .ok_or_else(not_found)?;
        let mut items = parse_file(&file)?.items;
        let mut dir = self.root.clone();

        for segment in segments {
            // the `mod` item must exist in the parent and survive its cfg
            let declared = items
                .iter()
                .find_map(|item| match item {
                    Item::Mod(m) if m.ident == segment && self.enabled(&m.attrs) => Some(m),
                    _ => None,
                })
                .ok_or_else(not_found)?;

            items = match declared.content.as_ref() {
                Some((_, inner)) => inner.clone(),
                None => {
                    file = [dir.join(format!("{segment}.rs")), dir.join(segment).join("mod.rs")]
                        .into_iter()
                        .find(|path| path.is_file())
                        .ok_or_else(not_found)?;
                    parse_file(&file)?.items
                }
            };
            dir = dir.join(segment);
        }

        items.retain(|item| self.enabled(item_attrs(item)));
        debug!(module, file = %file.display(), items = items.len(), "parsed module");
        Ok(ParsedModule { module: module.to_string(), file, items })
    }

    fn enabled(&self, attrs: &[Attribute]) -> bool {
        attrs
            .iter()
            .filter(|attr| attr.path().is_ident("cfg"))
            .all(|attr| attr.parse_args::<Meta>().map(|meta| self.holds(&meta)).unwrap_or(true))
    }

    fn holds(&self, meta: &Meta) -> bool {
        match meta {
            Meta::Path(path) => !path.is_ident("test"),
            Meta::NameValue(nv) if nv.path.is_ident("feature") => match &nv.value {
                Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => self.features.contains(&s.value()),
                _ => true,
            },
            Meta::NameValue(_) => true,
            Meta::List(list) => {
                let Ok(nested) = list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated) else {
                    return true;
                };
                if list.path.is_ident("all") {
                    nested.iter().all(|m| self.holds(m))
                } else if list.path.is_ident("any") {
                    nested.iter().any(|m| self.holds(m))
                } else if list.path.is_ident("not") {
                    !nested.iter().next().is_some_and(|m| self.holds(m))
                } else {
                    true
                }
            }
        }
    }

    fn member(&self, field: &syn::Field, scope: &Scope, file: &Path) -> Result<Member, LoadError> {
        let name = field.ident.as_ref().map(|i| i.unraw().to_string()).unwrap_or_default();
        Ok(Member {
            name,
            exported: !matches!(field.vis, syn::Visibility::Inherited),
            embedded: is_embedded(&field.attrs, file)?,
            shape: shape(&field.ty, scope),
        })
    }
}

impl DeclarationLoader for RustSource {
    fn load(&self, name: &QualifiedName) -> Result<Declaration, LoadError> {
        let parsed = self.module(&name.module)?;
        let scope = Scope::new(&parsed);

        for item in &parsed.items {
            let (ident, description) = match item {
                Item::Struct(s) => (&s.ident, "struct"),
                Item::Enum(e) => (&e.ident, "enum"),
                Item::Union(u) => (&u.ident, "union"),
                Item::Trait(t) => (&t.ident, "trait"),
                Item::Type(t) => (&t.ident, "type alias"),
                _ => continue,
            };
            if *ident != name.name {
                continue;
            }

            let Item::Struct(s) = item else {
                return Ok(Declaration::Other { description: description.to_string() });
            };
            let members = match &s.fields {
                Fields::Named(named) => named
                    .named
                    .iter()
                    .filter(|f| self.enabled(&f.attrs))
                    .map(|f| self.member(f, &scope, &parsed.file))
                    .collect::<Result<Vec<_>, _>>()?,
                Fields::Unit => Vec::new(),
                Fields::Unnamed(_) => {
                    return Ok(Declaration::Other { description: "tuple struct".to_string() });
                }
            };
            return Ok(Declaration::Struct { members });
        }

        Err(LoadError::TypeNotFound(name.clone()))
    }
}

impl ModuleDocs for RustSource {
    fn module_docs(&self, module: &str) -> Result<DocTable, LoadError> {
        let parsed = self.module(module)?;
        let mut table = DocTable::new();

        for item in &parsed.items {
            let Item::Struct(s) = item else { continue };
            let Fields::Named(named) = &s.fields else { continue };
            for field in named.named.iter().filter(|f| self.enabled(&f.attrs)) {
                let Some(ident) = &field.ident else { continue };
                let doc = doc_text(&field.attrs);
                if doc.is_empty() {
                    continue;
                }
                table.insert((s.ident.to_string(), ident.unraw().to_string()), doc);
            }
        }

        debug!(module, docs = table.len(), "collected field docs");
        Ok(table)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Name resolution context of one module: its path and its `use` imports.
struct Scope {
    module: Vec<String>,
    imports: HashMap<String, Vec<String>>,
}

impl Scope {
    fn new(parsed: &ParsedModule) -> Self {
        let module: Vec<String> = parsed.module.split("::").map(str::to_string).collect();
        let mut scope = Self { module, imports: HashMap::new() };

        let mut imports = HashMap::new();
        for item in &parsed.items {
            if let Item::Use(u) = item {
                collect_uses(&u.tree, Vec::new(), &mut imports);
            }
        }
        scope.imports = imports
            .into_iter()
            .map(|(alias, path)| {
                let absolute = scope.absolute(path);
                (alias, absolute)
            })
            .collect();
        scope
    }

    fn resolve(&self, path: &syn::Path) -> QualifiedName {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.unraw().to_string()).collect();
        let full = match self.imports.get(&segments[0]) {
            Some(imported) if path.leading_colon.is_none() => {
                imported.iter().cloned().chain(segments[1..].iter().cloned()).collect()
            }
            _ => self.absolute(segments),
        };
        let (name, module) = full.split_last().map(|(n, m)| (n.clone(), m.join("::"))).unwrap_or_default();
        QualifiedName::new(module, name)
    }

    // `crate::..` stays, `self::`/`super::` and bare paths are relative to the module
    fn absolute(&self, segments: Vec<String>) -> Vec<String> {
        match segments.first().map(String::as_str) {
            Some("crate") => segments,
            Some("self") => self.module.iter().cloned().chain(segments.into_iter().skip(1)).collect(),
            Some("super") => {
                let mut base = self.module.clone();
                let mut rest = segments.into_iter().peekable();
                while rest.peek().map(String::as_str) == Some("super") {
                    rest.next();
                    if base.len() > 1 {
                        base.pop();
                    }
                }
                base.extend(rest);
                base
            }
            _ => self.module.iter().cloned().chain(segments).collect(),
        }
    }
}

fn collect_uses(tree: &UseTree, prefix: Vec<String>, out: &mut HashMap<String, Vec<String>>) {
    match tree {
        UseTree::Path(p) => {
            let mut next = prefix;
            next.push(p.ident.unraw().to_string());
            collect_uses(&p.tree, next, out);
        }
        UseTree::Name(n) if n.ident == "self" => {
            if let Some(last) = prefix.last() {
                out.insert(last.clone(), prefix.clone());
            }
        }
        UseTree::Name(n) => {
            let name = n.ident.unraw().to_string();
            let mut full = prefix;
            full.push(name.clone());
            out.insert(name, full);
        }
        UseTree::Rename(r) => {
            let mut full = prefix;
            full.push(r.ident.unraw().to_string());
            out.insert(r.rename.unraw().to_string(), full);
        }
        UseTree::Group(g) => {
            for tree in &g.items {
                collect_uses(tree, prefix.clone(), out);
            }
        }
        UseTree::Glob(_) => {}
    }
}

fn shape(ty: &Type, scope: &Scope) -> Shape {
    match ty {
        Type::Paren(p) => shape(&p.elem, scope),
        Type::Group(g) => shape(&g.elem, scope),
        Type::Path(tp) if tp.qself.is_none() => {
            let path = &tp.path;
            if let Some(elem) = vec_element(path) {
                return Shape::List(type_display(elem));
            }
            if let Some(ident) = path.get_ident() {
                let name = ident.to_string();
                if PRIMITIVES.contains(&name.as_str()) {
                    return Shape::Scalar(name);
                }
            }
            if is_std_string(path) {
                return Shape::Scalar("String".to_string());
            }
            if path.segments.iter().any(|s| !s.arguments.is_none()) {
                return Shape::Other(type_display(ty));
            }
            Shape::Record(scope.resolve(path))
        }
        _ => Shape::Other(type_display(ty)),
    }
}

fn vec_element(path: &syn::Path) -> Option<&Type> {
    let last = path.segments.last()?;
    if last.ident != "Vec" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else { return None };
    match args.args.first() {
        Some(GenericArgument::Type(elem)) if args.args.len() == 1 => Some(elem),
        _ => None,
    }
}

fn is_std_string(path: &syn::Path) -> bool {
    let names: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
    matches!(
        names.iter().map(String::as_str).collect::<Vec<_>>().as_slice(),
        ["std" | "alloc", "string", "String"]
    )
}

// compact token rendering for error messages: `Vec<i64>`, `Option<String>`
fn type_display(ty: &Type) -> String {
    quote_type(ty)
        .replace(" < ", "<")
        .replace("< ", "<")
        .replace(" <", "<")
        .replace(" >", ">")
        .replace(" :: ", "::")
        .replace(":: ", "::")
        .replace(" ,", ",")
        .replace("& ", "&")
}

fn quote_type(ty: &Type) -> String {
    ty.to_token_stream().to_string()
}

fn is_embedded(attrs: &[Attribute], file: &Path) -> Result<bool, LoadError> {
    let mut embedded = false;
    for attr in attrs.iter().filter(|a| a.path().is_ident(ATTRIBUTE)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("embed") {
                embedded = true;
                Ok(())
            } else {
                Err(meta.error("unsupported telemetry attribute, expected `embed`"))
            }
        })
        .map_err(|err| LoadError::Parse { path: file.to_path_buf(), message: err.to_string() })?;
    }
    Ok(embedded)
}

/// Doc comment text of a field: every line trimmed, lines joined with `\n`.
/// Block comments lose their leading `*` gutter.
fn doc_text(attrs: &[Attribute]) -> String {
    let mut lines = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("doc")) {
        let Meta::NameValue(nv) = &attr.meta else { continue };
        let Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) = &nv.value else { continue };
        let value = s.value();
        let block = value.contains('\n');
        for line in value.lines() {
            let line = line.trim();
            let line = if block { line.strip_prefix('*').map(str::trim_start).unwrap_or(line) } else { line };
            lines.push(line.to_string());
        }
    }
    lines.join("\n").trim().to_string()
}

fn item_attrs(item: &Item) -> &[Attribute] {
    match item {
        Item::Const(i) => &i.attrs,
        Item::Enum(i) => &i.attrs,
        Item::Fn(i) => &i.attrs,
        Item::Mod(i) => &i.attrs,
        Item::Struct(i) => &i.attrs,
        Item::Trait(i) => &i.attrs,
        Item::Type(i) => &i.attrs,
        Item::Union(i) => &i.attrs,
        Item::Use(i) => &i.attrs,
        Item::Impl(i) => &i.attrs,
        Item::Static(i) => &i.attrs,
        _ => &[],
    }
}

fn parse_file(path: &Path) -> Result<syn::File, LoadError> {
    let source = std::fs::read_to_string(path).map_err(|err| LoadError::io(path, err))?;
    syn::parse_file(&source).map_err(|err| LoadError::Parse { path: path.to_path_buf(), message: err.to_string() })
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
