//! Admin access: a fixed allowlist of user ids, loaded at startup.

use std::collections::HashSet;

use loudquiz_core::question::UserId;

/// The set of users allowed into the authoring surface.
#[derive(Debug, Clone, Default)]
pub struct Access {
  admins: HashSet<UserId>,
}

impl Access {
  pub fn new(admins: impl IntoIterator<Item = UserId>) -> Self {
    Self { admins: admins.into_iter().collect() }
  }

  /// Parse a comma-separated id list (`"123, 456"`). Empty segments are
  /// skipped; a non-numeric segment is a configuration error.
  pub fn from_csv(csv: &str) -> Result<Self, std::num::ParseIntError> {
    let admins = csv
      .split(',')
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::parse)
      .collect::<Result<HashSet<UserId>, _>>()?;
    Ok(Self { admins })
  }

  pub fn is_admin(&self, user: UserId) -> bool {
    self.admins.contains(&user)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_comma_list_with_whitespace() {
    let access = Access::from_csv(" 1, 22 ,333,").unwrap();
    assert!(access.is_admin(1));
    assert!(access.is_admin(22));
    assert!(access.is_admin(333));
    assert!(!access.is_admin(4));
  }

  #[test]
  fn empty_list_grants_nobody() {
    let access = Access::from_csv("").unwrap();
    assert!(!access.is_admin(1));
  }

  #[test]
  fn rejects_garbage() {
    assert!(Access::from_csv("1,abc").is_err());
  }
}
