//! Contact membership.

use crate::settings::{ContactSettings, Settings};
use crate::sources::{ContactDirectory, Permissions};
use crate::types::{Attribution, Incoming, Verdict};

use super::{allow, block, Checker, CheckerKind};

/// Allows numbers in the address book; in exclusive mode blocks the rest.
pub struct ContactChecker<'a> {
    settings: &'a ContactSettings,
    priority: i32,
    contacts: &'a dyn ContactDirectory,
    permissions: &'a dyn Permissions,
}

impl<'a> ContactChecker<'a> {
    pub fn new(
        settings: &'a Settings,
        contacts: &'a dyn ContactDirectory,
        permissions: &'a dyn Permissions,
    ) -> Self {
        Self {
            settings: &settings.contacts,
            priority: settings.contact_priority(),
            contacts,
            permissions,
        }
    }
}

impl Checker for ContactChecker<'_> {
    fn kind(&self) -> CheckerKind {
        CheckerKind::Contact
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn evaluate(&self, incoming: &Incoming) -> Option<Verdict> {
        if !self.settings.enabled || !self.permissions.contacts_access_granted() {
            return None;
        }

        match self.contacts.find_contact_by_number(&incoming.number) {
            Some(contact) => {
                Some(allow(self.kind()).attributed(Attribution::ContactName(contact.name)))
            }
            None if self.settings.exclusive => Some(block(self.kind())),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::memory;
    use crate::sources::Grants;

    fn settings(exclusive: bool) -> Settings {
        let mut settings = Settings::default();
        settings.contacts = ContactSettings {
            enabled: true,
            exclusive,
        };
        settings
    }

    #[test]
    fn test_contact_allowed_with_name() {
        let mut mem = memory();
        mem.add_contact("Mom", "+1 555 000 1111");
        let s = settings(false);

        let verdict = ContactChecker::new(&s, &mem, &mem.grants)
            .evaluate(&Incoming::call("+15550001111", false, None))
            .unwrap();
        assert!(!verdict.blocks);
        assert_eq!(verdict.attribution, Some(Attribution::ContactName("Mom".into())));
    }

    #[test]
    fn test_stranger_abstains_unless_exclusive() {
        let mem = memory();
        let incoming = Incoming::sms("5559999", "hi");

        let open = settings(false);
        assert!(ContactChecker::new(&open, &mem, &mem.grants).evaluate(&incoming).is_none());

        let exclusive = settings(true);
        let verdict = ContactChecker::new(&exclusive, &mem, &mem.grants)
            .evaluate(&incoming)
            .unwrap();
        assert!(verdict.blocks);
        assert!(verdict.attribution.is_none());
    }

    #[test]
    fn test_missing_permission_abstains() {
        let mem = memory();
        let denied = Grants {
            contacts: false,
            history: true,
        };
        let s = settings(true);
        assert!(ContactChecker::new(&s, &mem, &denied)
            .evaluate(&Incoming::call("5559999", false, None))
            .is_none());
    }
}
