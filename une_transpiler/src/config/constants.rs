pub mod compile_time {
    pub mod lexical {
        /// Maximum source size per unit (4MB)
        /// SECURITY: Prevents DoS attacks via enormous source files
        /// SSDF: PW.7.1 (Input Validation), PW.8.1 (DoS Protection)
        pub const MAX_SOURCE_SIZE: usize = 4 * 1024 * 1024;

        /// Maximum number of tokens per unit
        /// SECURITY: Prevents DoS via token explosion attacks
        /// SSDF: PW.8.1 (DoS Protection)
        pub const MAX_TOKEN_COUNT: usize = 500_000;

        /// Maximum string literal length
        /// SECURITY: Limits resource consumption per literal
        /// SSDF: PW.7.1 (Input Validation)
        pub const MAX_STRING_LENGTH: usize = 65_536;

        /// Maximum inline code block length
        /// SECURITY: Inline code is opaque payload for the runtime;
        /// the transpiler still bounds the memory it carries
        /// SSDF: PW.8.1 (DoS Protection)
        pub const MAX_INLINE_CODE_LENGTH: usize = 65_536;

        /// Maximum bracketed list literal length
        /// SECURITY: Limits resource consumption per literal
        pub const MAX_LIST_LENGTH: usize = 16_384;
    }

    pub mod resolution {
        /// Maximum include nesting depth
        /// SECURITY: Prevents stack overflow via deeply nested includes
        /// SSDF: PW.8.1 (DoS Protection)
        pub const MAX_INCLUDE_DEPTH: usize = 32;

        /// Maximum transpilation units per run
        /// SECURITY: Prevents DoS via wildcard include explosion
        /// SSDF: PW.8.1 (DoS Protection)
        pub const MAX_UNITS_PER_RUN: usize = 256;

        /// Maximum rewrite rules in one macro table
        /// SECURITY: Prevents DoS via USE rule explosion
        /// SSDF: PW.8.1 (DoS Protection)
        pub const MAX_MACRO_RULES: usize = 1_000;

        /// Maximum macro expansions per command chunk
        /// SECURITY: Bounds splice work even for pathological rule sets
        /// SSDF: PW.8.1 (DoS Protection)
        pub const MAX_EXPANSIONS_PER_CHUNK: usize = 10_000;
    }

    pub mod syntax {
        /// Maximum items per clause (CONFIG/INIT properties, THEN actions)
        /// SECURITY: Prevents DoS via item explosion in one clause
        /// SSDF: PW.8.1 (DoS Protection)
        pub const MAX_CLAUSE_ITEMS: usize = 1_000;

        /// Maximum include table rows per INCLUDE command
        /// RESOURCE: Each row instantiates one unit; bounded with the
        /// unit ceiling in mind
        pub const MAX_TABLE_ROWS: usize = 128;
    }

    pub mod emit {
        /// Maximum diagnostic blocks rendered per unit report
        /// RESOURCE: Controls report output volume
        pub const MAX_REPORT_DIAGNOSTICS: usize = 100;
    }
}
