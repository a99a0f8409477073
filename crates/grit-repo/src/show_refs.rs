//! Ref enumeration with the show-ref option set.

use grit_hash::ObjectId;
use grit_object::ObjectType;
use grit_ref::{RefName, Reference};

use crate::{RepoError, Repository};

/// Options controlling ref enumeration and display.
#[derive(Debug, Clone, Default)]
pub struct ShowRefOptions {
    /// Prepend `HEAD` when it resolves; a dangling HEAD is silently
    /// omitted rather than reported.
    pub include_head: bool,
    /// Enumerate `refs/heads/`.
    pub heads: bool,
    /// Enumerate `refs/tags/`.
    pub tags: bool,
    /// After each annotated tag, also emit `<name>^{}` with the peeled
    /// commit.
    pub dereference: bool,
    /// Patterns must exactly name existing refs; any miss is fatal.
    pub verify: bool,
    /// Hex digits to print (0 = full). Display-only.
    pub abbrev: usize,
    /// Suppress output; the exit code still reflects presence.
    pub quiet: bool,
    /// Print only the hash column. Display-only.
    pub sha1_only: bool,
    /// Drop refs whose name starts with this prefix.
    pub exclude_existing: Option<String>,
}

/// One line of show-ref output: peeled entries carry the `^{}` suffix in
/// their name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownRef {
    pub name: String,
    pub oid: ObjectId,
}

impl Repository {
    /// Enumerate refs per `opts`, filtered by `patterns`.
    ///
    /// A ref matches a pattern exactly or on a `/`-separated suffix; an
    /// empty pattern list matches everything.
    pub fn show_refs(
        &self,
        opts: &ShowRefOptions,
        patterns: &[String],
    ) -> Result<Vec<ShownRef>, RepoError> {
        if opts.verify {
            return self.verify_refs(opts, patterns);
        }

        let mut shown = Vec::new();

        if opts.include_head {
            if let Some(commit) = self.head_commit()? {
                shown.push(ShownRef {
                    name: "HEAD".into(),
                    oid: commit.as_oid(),
                });
            }
        }

        let prefixes: &[&str] = if opts.heads && opts.tags {
            &["refs/heads/", "refs/tags/"]
        } else if opts.heads {
            &["refs/heads/"]
        } else if opts.tags {
            &["refs/tags/"]
        } else {
            &["refs/"]
        };

        for prefix in prefixes.iter().copied() {
            for reference in self.refs().iter(Some(prefix))? {
                let name = reference.name().clone();

                if !patterns.is_empty() && !patterns.iter().any(|p| name.matches(p)) {
                    continue;
                }
                if let Some(ref excl) = opts.exclude_existing {
                    if name.as_str().starts_with(excl.as_str()) {
                        continue;
                    }
                }

                let oid = match reference {
                    Reference::Direct { target, .. } => target,
                    Reference::Symbolic { .. } => {
                        // A symbolic ref inside refs/ pointing nowhere is
                        // skipped, mirroring the HEAD tolerance.
                        match self.refs().resolve_oid(&name)? {
                            Some(oid) => oid,
                            None => continue,
                        }
                    }
                };

                shown.push(ShownRef {
                    name: name.as_str().to_owned(),
                    oid,
                });
                self.push_peeled(opts, &name, &oid, &mut shown)?;
            }
        }

        Ok(shown)
    }

    /// Verify mode: every pattern must name an existing, resolvable ref.
    fn verify_refs(
        &self,
        opts: &ShowRefOptions,
        patterns: &[String],
    ) -> Result<Vec<ShownRef>, RepoError> {
        let mut shown = Vec::new();

        for pattern in patterns {
            let name = RefName::new(pattern.as_str())
                .map_err(|_| RepoError::VerifyFailed(pattern.clone()))?;
            if !self.refs().exists(&name)? {
                return Err(RepoError::VerifyFailed(pattern.clone()));
            }
            let oid = self
                .refs()
                .resolve_oid(&name)?
                .ok_or_else(|| RepoError::VerifyFailed(pattern.clone()))?;

            shown.push(ShownRef {
                name: name.as_str().to_owned(),
                oid,
            });
            self.push_peeled(opts, &name, &oid, &mut shown)?;
        }

        Ok(shown)
    }

    fn push_peeled(
        &self,
        opts: &ShowRefOptions,
        name: &RefName,
        oid: &ObjectId,
        shown: &mut Vec<ShownRef>,
    ) -> Result<(), RepoError> {
        if !opts.dereference {
            return Ok(());
        }
        if self.odb().type_of(oid)? != Some(ObjectType::Tag) {
            return Ok(());
        }
        if let Some(peeled) = self.odb().peel_tag(oid)? {
            shown.push(ShownRef {
                name: format!("{}^{{}}", name.as_str()),
                oid: peeled.as_oid(),
            });
        }
        Ok(())
    }
}
