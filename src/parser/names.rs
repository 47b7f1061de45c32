//! Interned file and function names.
//!
//! Every `fl=`, `fn=` and `cfn=` value is stored once in a [`NameTable`] and
//! referred to by a small copyable handle afterwards. Handles compare and hash
//! as integers, which keeps call-path keys cheap during aggregation.
//!
//! A table is created per run and passed into every parse of that run, so
//! trees built from different files of one batch share handles and can be
//! merged.

use std::collections::HashMap;

/// Handle of an interned file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileName(u32);

/// Handle of an interned function name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionName(u32);

/// Classification of xdebug function names
///
/// xdebug reports internal functions and file inclusions as pseudo-calls
/// with a prefix, e.g. `php::strlen` or `require_once::/srv/app/boot.php`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// A user-land function or method
    User,
    /// A function built into PHP or an extension
    Php,
    Require,
    RequireOnce,
    Include,
    IncludeOnce,
}

impl FunctionKind {
    const PREFIXES: [(&'static str, FunctionKind); 5] = [
        ("php::", FunctionKind::Php),
        ("require::", FunctionKind::Require),
        ("require_once::", FunctionKind::RequireOnce),
        ("include::", FunctionKind::Include),
        ("include_once::", FunctionKind::IncludeOnce),
    ];

    /// Split a raw function name into its kind and the text after the prefix
    pub fn classify(raw: &str) -> (FunctionKind, &str) {
        Self::PREFIXES
            .iter()
            .find_map(|(prefix, kind)| raw.strip_prefix(prefix).map(|rest| (*kind, rest)))
            .unwrap_or((FunctionKind::User, raw))
    }

    /// Whether the pseudo-call stands for a file being pulled in
    pub fn is_inclusion(self) -> bool {
        matches!(
            self,
            Self::Require | Self::RequireOnce | Self::Include | Self::IncludeOnce
        )
    }
}

/// Display form of a function name with the pseudo-call prefix removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanName<'a> {
    /// Bare function name (`php::strlen` becomes `strlen`)
    Function(&'a str),
    /// File referenced by an include/require pseudo-call
    File(FileName),
}

#[derive(Debug, Clone)]
struct FunctionEntry {
    raw: Box<str>,
    kind: FunctionKind,
    // byte offset of the bare name inside `raw`
    clean_start: usize,
    included: Option<FileName>,
}

/// Intern table for file and function names
///
/// Handles are only meaningful for the table that issued them; looking up a
/// handle from another table panics or returns an unrelated name.
#[derive(Debug, Default, Clone)]
pub struct NameTable {
    files: Vec<Box<str>>,
    file_ids: HashMap<Box<str>, FileName>,
    functions: Vec<FunctionEntry>,
    function_ids: HashMap<Box<str>, FunctionName>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a file name, returning the existing handle for a known value
    pub fn intern_file(&mut self, name: &str) -> FileName {
        if let Some(id) = self.file_ids.get(name) {
            return *id;
        }
        let id = FileName(self.files.len() as u32);
        self.files.push(name.into());
        self.file_ids.insert(name.into(), id);
        id
    }

    /// Intern a function name, classifying it on first sight
    pub fn intern_function(&mut self, name: &str) -> FunctionName {
        if let Some(id) = self.function_ids.get(name) {
            return *id;
        }

        let (kind, rest) = FunctionKind::classify(name);
        let included = kind.is_inclusion().then(|| self.intern_file(rest));

        let id = FunctionName(self.functions.len() as u32);
        self.functions.push(FunctionEntry {
            raw: name.into(),
            kind,
            clean_start: name.len() - rest.len(),
            included,
        });
        self.function_ids.insert(name.into(), id);
        id
    }

    pub fn file(&self, id: FileName) -> &str {
        &self.files[id.0 as usize]
    }

    /// Raw function name exactly as it appeared in the profile
    pub fn function(&self, id: FunctionName) -> &str {
        &self.function_entry(id).raw
    }

    pub fn function_kind(&self, id: FunctionName) -> FunctionKind {
        self.function_entry(id).kind
    }

    pub fn clean(&self, id: FunctionName) -> CleanName<'_> {
        let entry = self.function_entry(id);
        match entry.included {
            Some(file) => CleanName::File(file),
            None => CleanName::Function(&entry.raw[entry.clean_start..]),
        }
    }

    /// Text of [`NameTable::clean`], resolving included files to their name
    pub fn clean_label(&self, id: FunctionName) -> &str {
        match self.clean(id) {
            CleanName::Function(name) => name,
            CleanName::File(file) => self.file(file),
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    fn function_entry(&self, id: FunctionName) -> &FunctionEntry {
        &self.functions[id.0 as usize]
    }
}
