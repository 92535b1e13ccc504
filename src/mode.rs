/// Parsing mode, expressed as the three orthogonal knobs from the design
/// notes rather than as forked code paths. Every call site that branches on
/// leniency consults one of these flags; none of them re-implement a
/// "strict" twin of a lenient function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    /// Attempt [`crate::brute_force::BruteForceScanner`]-based repair when an
    /// xref offset does not resolve to the expected `N G obj` header, or when
    /// `startxref`/the xref chain is missing entirely.
    pub recover_on_bad_offsets: bool,
    /// Record fine-grained PDF/A-1b conformance signals onto
    /// [`crate::validation::ValidationSink`] as parsing proceeds.
    pub record_diagnostics: bool,
    /// On an offset mismatch, drop the xref entry instead of replacing it
    /// with the brute-force result. Validation mode drops; lenient mode
    /// replaces.
    pub drop_instead_of_replace: bool,
}

impl Mode {
    /// Default mode: recovers aggressively, does not record diagnostics.
    pub const fn lenient() -> Self {
        Mode {
            recover_on_bad_offsets: true,
            record_diagnostics: false,
            drop_instead_of_replace: false,
        }
    }

    /// No recovery: any malformed section is fatal.
    pub const fn strict() -> Self {
        Mode {
            recover_on_bad_offsets: false,
            record_diagnostics: false,
            drop_instead_of_replace: false,
        }
    }

    /// Lenient recovery plus full diagnostic recording; offset mismatches are
    /// dropped rather than patched so the validation signals reflect exactly
    /// what was on disk.
    pub const fn validation() -> Self {
        Mode {
            recover_on_bad_offsets: true,
            record_diagnostics: true,
            drop_instead_of_replace: true,
        }
    }

    pub fn is_strict(&self) -> bool {
        !self.recover_on_bad_offsets && !self.record_diagnostics
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::lenient()
    }
}

/// Tunable knobs that are not part of the lenient/strict/validation split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    pub mode: Mode,
    /// Bytes to scan backwards from EOF for `%%EOF` / `startxref`. Default
    /// 2048; minimum accepted 16.
    pub eof_lookup_range: usize,
    /// Recursion/nesting depth limit (dictionary depth, `/Length` chains).
    pub max_recursion_depth: usize,
}

pub const DEFAULT_EOF_LOOKUP_RANGE: usize = 2048;
pub const MIN_EOF_LOOKUP_RANGE: usize = 16;
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 200;

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            mode: Mode::default(),
            eof_lookup_range: DEFAULT_EOF_LOOKUP_RANGE,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }
}

impl ParserConfig {
    pub fn new(mode: Mode) -> Self {
        ParserConfig { mode, ..Default::default() }
    }

    /// Set the EOF lookup range, clamped to the documented minimum of 16.
    pub fn with_eof_lookup_range(mut self, bytes: usize) -> Self {
        self.eof_lookup_range = bytes.max(MIN_EOF_LOOKUP_RANGE);
        self
    }

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }
}
