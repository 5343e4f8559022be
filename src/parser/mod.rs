//! ACL Item Parsing
//!
//! Turns one unnested `aclitem` string into an [`Acl`]:
//!
//! ```text
//! testrole=arwdDxt/gpadmin     -- plain privileges
//! =r*/gpadmin                  -- PUBLIC, SELECT WITH GRANT OPTION
//! "my role"=U/gpadmin          -- quoted grantee kept as written
//! ```
//!
//! ## Limitations
//!
//! - `D` (TRUNCATE) is not granted by this tool and is skipped
//! - The grantor is parsed but not kept; grants are replayed by the owner

use once_cell::sync::OnceCell;
use regex::Regex;
use tracing::debug;

use crate::error::{BackupError, BackupResult};
use crate::metadata::{Acl, Privilege};

static ACL_ITEM: OnceCell<Regex> = OnceCell::new();

fn acl_item_regex() -> BackupResult<&'static Regex> {
    ACL_ITEM.get_or_try_init(|| {
        Regex::new(
            r"(?x)
            ^(.*)                # grantee (empty for PUBLIC)
            =
            ([a-zA-Z\*]*)        # privilege letters, * marks grant option
            /
            (.*)$                # grantor
            ",
        )
        .map_err(|e| BackupError::InternalError {
            message: format!("Regex compilation failed: {e}"),
            file: file!(),
            line: line!(),
        })
    })
}

/// Parse one ACL item
///
/// Returns `Ok(None)` for an empty item and an error for text that is not
/// shaped like `grantee=privileges/grantor`.
pub fn parse_acl(item: &str) -> BackupResult<Option<Acl>> {
    if item.is_empty() {
        return Ok(None);
    }

    let caps = acl_item_regex()?
        .captures(item)
        .ok_or_else(|| BackupError::InvalidAclItem {
            item: item.to_string(),
            reason: "expected grantee=privileges/grantor".to_string(),
        })?;

    let grantee = caps.get(1).map_or("", |m| m.as_str());
    let letters = caps.get(2).map_or("", |m| m.as_str());

    let mut acl = Acl {
        grantee: grantee.to_string(),
        ..Default::default()
    };

    let mut chars = letters.chars().peekable();
    while let Some(letter) = chars.next() {
        let with_grant = chars.next_if_eq(&'*').is_some();
        match Privilege::from_acl_letter(letter) {
            Some(privilege) if with_grant => {
                acl.grantable.insert(privilege);
            }
            Some(privilege) => {
                acl.privileges.insert(privilege);
            }
            None => {
                debug!("Skipping privilege '{}' in ACL item '{}'", letter, item);
            }
        }
    }

    Ok(Some(acl))
}
