//! Contact search, derived from direct chats.
//!
//! There is no contacts table. The directory is recomputed on every search
//! from chats carrying the direct suffix; group chats never appear.

use crate::error::ApiError;
use crate::jid;
use crate::models::Contact;
use crate::services::store;
use rusqlite::Connection;

/// Case-insensitive substring search over name and jid. An empty query
/// returns the whole directory, capped like any other search.
pub fn search_contacts(conn: &Connection, query: &str) -> Result<Vec<Contact>, ApiError> {
    let rows = store::direct_contacts(conn, query)?;
    Ok(rows
        .into_iter()
        .map(|(contact_jid, name)| {
            let phone_number = jid::local_part(&contact_jid).to_string();
            Contact {
                name: name
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| phone_number.clone()),
                phone_number,
                jid: contact_jid,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::tests::{insert_chat, test_conn, ts};

    #[test]
    fn test_name_and_jid_both_match() {
        let conn = test_conn();
        insert_chat(&conn, "551@s.whatsapp.net", Some("Ana"), ts(1));
        insert_chat(&conn, "anaXYZ@s.whatsapp.net", Some("Bob"), ts(2));
        insert_chat(&conn, "552@s.whatsapp.net", Some("Carol"), ts(3));

        let contacts = search_contacts(&conn, "ana").unwrap();
        let names: Vec<&str> = contacts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bob"]);
    }

    #[test]
    fn test_phone_number_is_the_jid_local_part() {
        let conn = test_conn();
        insert_chat(&conn, "5511999990001@s.whatsapp.net", Some("Ana"), ts(1));

        let contacts = search_contacts(&conn, "").unwrap();
        assert_eq!(contacts[0].phone_number, "5511999990001");
    }

    #[test]
    fn test_missing_name_falls_back_to_phone_number() {
        let conn = test_conn();
        insert_chat(&conn, "5511999990001@s.whatsapp.net", None, ts(1));

        let contacts = search_contacts(&conn, "").unwrap();
        assert_eq!(contacts[0].name, "5511999990001");
    }

    #[test]
    fn test_groups_never_appear() {
        let conn = test_conn();
        insert_chat(&conn, "120363040000000000@g.us", Some("Ana's group"), ts(1));
        insert_chat(&conn, "551@s.whatsapp.net", Some("Ana"), ts(2));

        let contacts = search_contacts(&conn, "ana").unwrap();
        assert_eq!(contacts.len(), 1);
        assert!(contacts.iter().all(|c| !jid::is_group(&c.jid)));
    }
}
