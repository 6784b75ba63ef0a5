//! Error recovery.
//!
//! After a declaration fails to parse, skip forward to the next token that
//! can begin a top-level declaration so the rest of the unit still parses
//! and diagnostics batch up.

use crate::Cursor;
use graft_ir::TokenKind;

/// Tokens that can begin a top-level declaration.
fn is_decl_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Fn
            | TokenKind::Struct
            | TokenKind::Enum
            | TokenKind::Sum
            | TokenKind::Union
            | TokenKind::Tuple
            | TokenKind::Newtype
            | TokenKind::Subtype
    )
}

/// Skip to the next declaration boundary (or end of input).
///
/// Always makes progress: if the cursor already sits on a declaration
/// start (the failed declaration's own keyword), it advances past it
/// first.
pub fn synchronize(cursor: &mut Cursor<'_>) {
    if !cursor.is_at_end() {
        cursor.advance();
    }
    while !cursor.is_at_end() && !is_decl_start(cursor.current_kind()) {
        cursor.advance();
    }
}
