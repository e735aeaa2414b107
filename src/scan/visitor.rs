//! Syntax visitors that locate embedding macro invocations in one source file

use crate::error::{EmbedError, Result};
use proc_macro2::{Spacing, Span, TokenStream, TokenTree};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};
use syn::{Expr, ExprLit, Lit, Token, UseTree};

/// The four embedding macros
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    NewDir,
    MustDir,
    NewFile,
    MustFile,
}

impl EntryPoint {
    pub const ALL: [EntryPoint; 4] = [
        EntryPoint::NewDir,
        EntryPoint::MustDir,
        EntryPoint::NewFile,
        EntryPoint::MustFile,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ep| ep.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntryPoint::NewDir => "new_dir",
            EntryPoint::MustDir => "must_dir",
            EntryPoint::NewFile => "new_file",
            EntryPoint::MustFile => "must_file",
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, EntryPoint::NewDir | EntryPoint::MustDir)
    }
}

/// One embedding call found in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundCall {
    pub entry: EntryPoint,
    /// Path argument exactly as written in the literal
    pub literal: String,
    /// Names of the inline `mod` blocks enclosing the call, outermost first
    pub inline_modules: Vec<String>,
    pub line: usize,
    pub column: usize,
}

/// Parse `source` and return every embedding call in it
///
/// `facilities` are the crate names the macros may be imported from.
pub fn find_calls(path: &Path, source: &str, facilities: &[String]) -> Result<Vec<FoundCall>> {
    let file = syn::parse_file(source).map_err(|e| {
        let start = e.span().start();
        EmbedError::GenerationSyntax {
            file: path.to_path_buf(),
            line: start.line,
            column: start.column + 1,
            message: format!("failed to parse: {}", e),
        }
    })?;

    let mut imports = Imports::new(facilities);
    imports.visit_file(&file);

    let mut calls = CallCollector {
        path,
        imports: &imports,
        modules: Vec::new(),
        found: Vec::new(),
        error: None,
    };
    calls.visit_file(&file);

    match calls.error {
        Some(err) => Err(err),
        None => Ok(calls.found),
    }
}

/// Names under which the embedding macros are reachable in a file
#[derive(Debug, Default)]
struct Imports {
    facilities: HashSet<String>,
    /// Local names of the facility crate (its own name, `as` renames)
    crate_aliases: HashSet<String>,
    /// Local macro name to entry point
    macros: HashMap<String, EntryPoint>,
    /// `#[macro_use] extern crate` brings the bare names into scope
    macro_use: bool,
}

impl Imports {
    fn new(facilities: &[String]) -> Self {
        let facilities: HashSet<String> = facilities.iter().cloned().collect();
        Self {
            crate_aliases: facilities.clone(),
            facilities,
            ..Default::default()
        }
    }

    fn is_facility(&self, name: &str) -> bool {
        self.facilities.contains(name) || self.crate_aliases.contains(name)
    }

    fn collect_use(&mut self, prefix: &mut Vec<String>, tree: &UseTree) {
        match tree {
            UseTree::Path(p) => {
                prefix.push(p.ident.to_string());
                self.collect_use(prefix, &p.tree);
                prefix.pop();
            }
            UseTree::Name(n) => {
                let name = n.ident.to_string();
                self.bind(prefix, &name, &name);
            }
            UseTree::Rename(r) => {
                self.bind(prefix, &r.ident.to_string(), &r.rename.to_string());
            }
            UseTree::Glob(_) => {
                if prefix.len() == 1 && self.is_facility(&prefix[0]) {
                    for ep in EntryPoint::ALL {
                        self.macros.insert(ep.name().to_string(), ep);
                    }
                }
            }
            UseTree::Group(g) => {
                for item in &g.items {
                    self.collect_use(prefix, item);
                }
            }
        }
    }

    /// Record `use <prefix>::<name> as <local>`
    fn bind(&mut self, prefix: &[String], name: &str, local: &str) {
        match prefix {
            // use embedfs as emb;
            [] if self.facilities.contains(name) => {
                self.crate_aliases.insert(local.to_string());
            }
            // use embedfs::{self as emb};
            [krate] if name == "self" && self.is_facility(krate) => {
                self.crate_aliases.insert(local.to_string());
            }
            // use embedfs::new_dir as nd;
            [krate] if self.is_facility(krate) => {
                if let Some(ep) = EntryPoint::from_name(name) {
                    self.macros.insert(local.to_string(), ep);
                }
            }
            _ => {}
        }
    }

    fn resolve(&self, path: &syn::Path) -> Option<EntryPoint> {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        match segments.as_slice() {
            [name] if path.leading_colon.is_none() => self.resolve_name(None, name),
            [krate, name] => self.resolve_name(Some(krate.as_str()), name),
            _ => None,
        }
    }

    /// Resolve `name!` or `krate::name!`
    fn resolve_name(&self, krate: Option<&str>, name: &str) -> Option<EntryPoint> {
        match krate {
            None => self.macros.get(name).copied().or_else(|| {
                if self.macro_use {
                    EntryPoint::from_name(name)
                } else {
                    None
                }
            }),
            Some(krate) if self.is_facility(krate) => EntryPoint::from_name(name),
            Some(_) => None,
        }
    }

    /// First embedding macro named anywhere in `tokens`, with the span of its name
    fn find_in_tokens(&self, tokens: TokenStream) -> Option<(EntryPoint, Span)> {
        let trees: Vec<TokenTree> = tokens.into_iter().collect();
        for (i, tree) in trees.iter().enumerate() {
            match tree {
                TokenTree::Group(group) => {
                    if let Some(found) = self.find_in_tokens(group.stream()) {
                        return Some(found);
                    }
                }
                TokenTree::Punct(bang) if bang.as_char() == '!' && bang.spacing() == Spacing::Alone => {
                    let Some(TokenTree::Ident(name)) = i.checked_sub(1).map(|j| &trees[j]) else {
                        continue;
                    };
                    let krate = match i.checked_sub(4).map(|j| &trees[j..i - 1]) {
                        Some([TokenTree::Ident(krate), TokenTree::Punct(a), TokenTree::Punct(b)])
                            if a.as_char() == ':' && b.as_char() == ':' =>
                        {
                            Some(krate.to_string())
                        }
                        _ => None,
                    };
                    if let Some(entry) = self.resolve_name(krate.as_deref(), &name.to_string()) {
                        return Some((entry, name.span()));
                    }
                }
                _ => {}
            }
        }
        None
    }
}

impl<'ast> Visit<'ast> for Imports {
    fn visit_item_use(&mut self, item: &'ast syn::ItemUse) {
        let mut prefix = Vec::new();
        self.collect_use(&mut prefix, &item.tree);
    }

    fn visit_item_extern_crate(&mut self, item: &'ast syn::ItemExternCrate) {
        let name = item.ident.to_string();
        if !self.facilities.contains(&name) {
            return;
        }
        if let Some((_, rename)) = &item.rename {
            self.crate_aliases.insert(rename.to_string());
        }
        if item.attrs.iter().any(|a| a.path().is_ident("macro_use")) {
            self.macro_use = true;
        }
    }
}

struct CallCollector<'a> {
    path: &'a Path,
    imports: &'a Imports,
    modules: Vec<String>,
    found: Vec<FoundCall>,
    error: Option<EmbedError>,
}

impl CallCollector<'_> {
    fn syntax_error(&self, span: Span, message: String) -> EmbedError {
        let start = span.start();
        EmbedError::GenerationSyntax {
            file: self.path.to_path_buf(),
            line: start.line,
            column: start.column + 1,
            message,
        }
    }

    fn record(&mut self, mac: &syn::Macro, entry: EntryPoint) -> Result<()> {
        let span = mac
            .path
            .segments
            .last()
            .map(|s| s.ident.span())
            .unwrap_or_else(Span::call_site);

        let args = mac
            .parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated)
            .map_err(|e| {
                self.syntax_error(e.span(), format!("{}! arguments: {}", entry.name(), e))
            })?;

        if args.len() != 2 {
            return Err(self.syntax_error(
                span,
                format!(
                    "{}! takes a resolver and a path, got {} arguments",
                    entry.name(),
                    args.len()
                ),
            ));
        }

        let literal = match &args[1] {
            Expr::Lit(ExprLit {
                lit: Lit::Str(s), ..
            }) => s.value(),
            _ => {
                return Err(self.syntax_error(
                    span,
                    format!("{}! was not called with a string literal", entry.name()),
                ))
            }
        };

        let start = span.start();
        self.found.push(FoundCall {
            entry,
            literal,
            inline_modules: self.modules.clone(),
            line: start.line,
            column: start.column + 1,
        });
        Ok(())
    }
}

impl<'ast> Visit<'ast> for CallCollector<'_> {
    fn visit_item_mod(&mut self, item: &'ast syn::ItemMod) {
        // `mod name;` lives in its own file and is scanned as its own unit
        if item.content.is_none() {
            return;
        }
        self.modules.push(item.ident.to_string());
        visit::visit_item_mod(self, item);
        self.modules.pop();
    }

    fn visit_macro(&mut self, mac: &'ast syn::Macro) {
        if self.error.is_some() {
            return;
        }
        let result = match self.imports.resolve(&mac.path) {
            Some(entry) => self.record(mac, entry),
            None => self.visit_foreign_macro(mac),
        };
        if let Err(e) = result {
            self.error = Some(e);
        }
    }
}

impl CallCollector<'_> {
    /// Look for embedding calls inside another macro's arguments.
    ///
    /// Bodies shaped like call arguments (`println!`, `vec![..]`,
    /// `assert_eq!`) or statements (`thread_local!`) are visited as code. Any
    /// other body that still names an embedding macro fails the run, since
    /// the call could not be packed.
    fn visit_foreign_macro(&mut self, mac: &syn::Macro) -> Result<()> {
        if let Ok(args) = mac.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
            for arg in &args {
                visit::visit_expr(self, arg);
            }
            return Ok(());
        }
        if let Ok(stmts) = mac.parse_body_with(syn::Block::parse_within) {
            for stmt in &stmts {
                visit::visit_stmt(self, stmt);
            }
            return Ok(());
        }

        match self.imports.find_in_tokens(mac.tokens.clone()) {
            Some((entry, span)) => {
                let outer = mac
                    .path
                    .segments
                    .last()
                    .map(|s| s.ident.to_string())
                    .unwrap_or_default();
                Err(self.syntax_error(
                    span,
                    format!(
                        "{}! inside {}! cannot be scanned; move it out of the macro",
                        entry.name(),
                        outer
                    ),
                ))
            }
            None => Ok(()),
        }
    }
}
