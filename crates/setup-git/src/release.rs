//! Release tags across component working copies

use setup_fs::NormalizedPath;

use crate::helpers;
use crate::source::ORIGIN;
use crate::{Error, Result};

/// What tagging one working copy did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOutcome {
    pub tag: String,
    /// Commit the tag points at
    pub commit: String,
    /// False in dry-run mode
    pub pushed: bool,
}

/// Create a lightweight `tag` at HEAD of the working copy at `path` and push
/// it to `origin`.
///
/// In dry-run mode the tag name and HEAD are validated but nothing is created
/// or pushed.
pub fn tag_release(path: &NormalizedPath, tag: &str, dry_run: bool) -> Result<TagOutcome> {
    let refname = format!("refs/tags/{tag}");
    if !git2::Reference::is_valid_name(&refname) {
        return Err(Error::InvalidTagName {
            name: tag.to_string(),
        });
    }

    let repo = helpers::open(&path.to_native())?;
    if repo.find_reference(&refname).is_ok() {
        return Err(Error::TagExists {
            name: tag.to_string(),
        });
    }

    let head = repo.head()?.peel_to_commit()?;
    let commit = head.id().to_string();

    if dry_run {
        tracing::info!(path = %path, tag, commit = %commit, "Would tag");
        return Ok(TagOutcome {
            tag: tag.to_string(),
            commit,
            pushed: false,
        });
    }

    repo.tag_lightweight(tag, head.as_object(), false)?;
    tracing::info!(path = %path, tag, commit = %commit, "Tagged");

    helpers::push(&repo, ORIGIN, &format!("{refname}:{refname}"))?;

    Ok(TagOutcome {
        tag: tag.to_string(),
        commit,
        pushed: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_tag_name_rejected_before_opening() {
        let path = NormalizedPath::new("/nonexistent");
        assert!(matches!(
            tag_release(&path, "bad..name", true),
            Err(Error::InvalidTagName { .. })
        ));
    }
}
