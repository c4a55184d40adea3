/// Mock messenger: a fixed contact list and an in-memory conversation.
///
/// Nothing leaves the process. Selecting a contact fabricates the same
/// five-message history every time; sending appends to it locally.

/// Sender id used for the local user.
pub const MY_ID: u32 = 0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contact {
    pub id: u32,
    pub name: String,
    pub online: bool,
    pub last_seen: Option<String>,
}

impl Contact {
    fn new(id: u32, name: &str, online: bool, last_seen: Option<&str>) -> Self {
        Contact { id, name: name.to_string(), online, last_seen: last_seen.map(str::to_string) }
    }

    /// Presence text for the list and the conversation header.
    pub fn status_line(&self) -> String {
        match (&self.last_seen, self.online) {
            (_, true) => "online".to_string(),
            (Some(t), false) => format!("last seen {t}"),
            (None, false) => "offline".to_string(),
        }
    }

    pub fn initial(&self) -> char {
        self.name.chars().next().unwrap_or('?')
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub id: u32,
    pub sender_id: u32,
    pub text: String,
    pub timestamp: String,
    pub is_mine: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChatFocus {
    Search,
    Contacts,
    Draft,
}

impl ChatFocus {
    pub fn next(self) -> ChatFocus {
        match self {
            ChatFocus::Search => ChatFocus::Contacts,
            ChatFocus::Contacts => ChatFocus::Draft,
            ChatFocus::Draft => ChatFocus::Search,
        }
    }
}

pub fn seed_contacts() -> Vec<Contact> {
    vec![
        Contact::new(1, "Anna Smirnova", true, None),
        Contact::new(2, "Ivan Petrov", false, Some("14:03")),
        Contact::new(3, "Maria Ivanova", true, None),
        Contact::new(4, "Sergey Kozlov", false, Some("Yesterday")),
        Contact::new(5, "Olga Sokolova", true, None),
    ]
}

/// The canned history shown for any contact.
pub fn seed_messages(contact_id: u32) -> Vec<Message> {
    let script: [(bool, &str, &str); 5] = [
        (false, "Hi, how are you?", "14:22"),
        (true, "Hi! All good, thanks. And you?", "14:23"),
        (false, "Not bad either. Any plans for the weekend?", "14:25"),
        (true, "Thinking of going to the cinema, haven't been in ages. Join me?", "14:26"),
        (false, "Gladly! Which film do you want to see?", "14:30"),
    ];
    script
        .iter()
        .enumerate()
        .map(|(i, &(mine, text, ts))| Message {
            id: i as u32 + 1,
            sender_id: if mine { MY_ID } else { contact_id },
            text: text.to_string(),
            timestamp: ts.to_string(),
            is_mine: mine,
        })
        .collect()
}

/// "HH:MM" wall-clock time for a message sent `secs` after the Unix epoch,
/// shifted by the local offset from UTC.
pub fn clock_label(secs: u64, utc_offset_minutes: i32) -> String {
    let local = (secs as i64 + i64::from(utc_offset_minutes) * 60).rem_euclid(86_400);
    format!("{:02}:{:02}", local / 3600, (local / 60) % 60)
}

pub struct ChatState {
    pub contacts: Vec<Contact>,
    pub selected: Option<u32>,
    pub messages: Vec<Message>,
    pub draft: String,
    pub query: String,
    pub focus: ChatFocus,
    /// Index into `visible_contacts()`.
    pub cursor: usize,
}

impl ChatState {
    pub fn new() -> Self {
        ChatState {
            contacts: seed_contacts(),
            selected: None,
            messages: Vec::new(),
            draft: String::new(),
            query: String::new(),
            focus: ChatFocus::Contacts,
            cursor: 0,
        }
    }

    /// Select a contact and load its (fabricated) history.
    /// Unknown ids leave everything as it was.
    pub fn select_contact(&mut self, id: u32) -> bool {
        if !self.contacts.iter().any(|c| c.id == id) {
            return false;
        }
        self.selected = Some(id);
        self.messages = seed_messages(id);
        true
    }

    pub fn selected_contact(&self) -> Option<&Contact> {
        let id = self.selected?;
        self.contacts.iter().find(|c| c.id == id)
    }

    /// Send the draft. No-op without a selected contact or with a blank draft.
    pub fn send(&mut self, timestamp: &str) -> bool {
        if self.selected.is_none() || self.draft.trim().is_empty() {
            return false;
        }
        let text = std::mem::take(&mut self.draft);
        self.messages.push(Message {
            id: self.messages.len() as u32 + 1,
            sender_id: MY_ID,
            text,
            timestamp: timestamp.to_string(),
            is_mine: true,
        });
        true
    }

    /// Typed character goes to whichever field has focus.
    pub fn push_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        match self.focus {
            ChatFocus::Search => {
                self.query.push(c);
                self.cursor = 0;
            }
            ChatFocus::Draft => self.draft.push(c),
            ChatFocus::Contacts => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            ChatFocus::Search => {
                self.query.pop();
                self.cursor = 0;
            }
            ChatFocus::Draft => {
                self.draft.pop();
            }
            ChatFocus::Contacts => {}
        }
    }

    /// Contacts whose name contains the search query (case-insensitive).
    pub fn visible_contacts(&self) -> Vec<&Contact> {
        let q = self.query.trim().to_lowercase();
        self.contacts
            .iter()
            .filter(|c| q.is_empty() || c.name.to_lowercase().contains(&q))
            .collect()
    }

    pub fn move_cursor(&mut self, delta: i32) {
        let n = self.visible_contacts().len();
        if n == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as i32 + delta).clamp(0, n as i32 - 1);
        self.cursor = next as usize;
    }

    /// Select the contact under the cursor and move focus to the draft.
    pub fn select_at_cursor(&mut self) -> bool {
        let id = match self.visible_contacts().get(self.cursor) {
            Some(c) => c.id,
            None => return false,
        };
        let ok = self.select_contact(id);
        if ok {
            self.focus = ChatFocus::Draft;
        }
        ok
    }

    pub fn cycle_focus(&mut self) {
        self.focus = self.focus.next();
    }
}

impl Default for ChatState {
    fn default() -> Self {
        ChatState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_seeds_history_for_contact() {
        let mut chat = ChatState::new();
        assert!(chat.select_contact(3));
        assert_eq!(chat.messages.len(), 5);
        assert_eq!(chat.messages, seed_messages(3));
        assert!(chat.messages.iter().filter(|m| !m.is_mine).all(|m| m.sender_id == 3));
        assert!(chat.messages.iter().filter(|m| m.is_mine).all(|m| m.sender_id == MY_ID));
        let ids: Vec<u32> = chat.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn reselect_discards_sent_messages() {
        let mut chat = ChatState::new();
        chat.select_contact(1);
        chat.draft = "see you".into();
        chat.send("15:00");
        chat.select_contact(1);
        assert_eq!(chat.messages, seed_messages(1));
    }

    #[test]
    fn unknown_contact_is_ignored() {
        let mut chat = ChatState::new();
        assert!(!chat.select_contact(99));
        assert!(chat.selected.is_none());
        assert!(chat.messages.is_empty());
    }

    #[test]
    fn send_appends_one_and_clears_draft() {
        let mut chat = ChatState::new();
        chat.select_contact(2);
        chat.draft = "  popcorn?  ".into();
        assert!(chat.send("15:42"));
        assert_eq!(chat.messages.len(), 6);
        let last = chat.messages.last().unwrap();
        assert_eq!(last.id, 6);
        assert!(last.is_mine);
        assert_eq!(last.sender_id, MY_ID);
        assert_eq!(last.text, "  popcorn?  ");
        assert_eq!(last.timestamp, "15:42");
        assert!(chat.draft.is_empty());
    }

    #[test]
    fn send_without_selection_is_noop() {
        let mut chat = ChatState::new();
        chat.draft = "hello".into();
        assert!(!chat.send("15:00"));
        assert!(chat.messages.is_empty());
        assert_eq!(chat.draft, "hello");
    }

    #[test]
    fn send_blank_is_noop() {
        let mut chat = ChatState::new();
        chat.select_contact(5);
        chat.draft = " \t ".into();
        assert!(!chat.send("15:00"));
        assert_eq!(chat.messages.len(), 5);
    }

    #[test]
    fn search_filters_and_resets_cursor() {
        let mut chat = ChatState::new();
        chat.cursor = 3;
        chat.focus = ChatFocus::Search;
        for c in "IVAN".chars() {
            chat.push_char(c);
        }
        assert_eq!(chat.cursor, 0);
        let names: Vec<&str> = chat.visible_contacts().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ivan Petrov", "Maria Ivanova"]);
        chat.move_cursor(5);
        assert_eq!(chat.cursor, 1);
        assert!(chat.select_at_cursor());
        assert_eq!(chat.selected, Some(3));
        assert_eq!(chat.focus, ChatFocus::Draft);
    }

    #[test]
    fn empty_search_result_selects_nothing() {
        let mut chat = ChatState::new();
        chat.query = "zzz".into();
        chat.move_cursor(1);
        assert!(!chat.select_at_cursor());
        assert!(chat.selected.is_none());
    }

    #[test]
    fn typing_routes_by_focus() {
        let mut chat = ChatState::new();
        chat.push_char('x');
        assert!(chat.draft.is_empty() && chat.query.is_empty());
        chat.cycle_focus();
        assert_eq!(chat.focus, ChatFocus::Draft);
        chat.push_char('h');
        chat.push_char('i');
        chat.pop_char();
        assert_eq!(chat.draft, "h");
    }

    #[test]
    fn clock_label_wraps_days() {
        assert_eq!(clock_label(0, 0), "00:00");
        assert_eq!(clock_label(9 * 3600 + 41 * 60 + 59, 0), "09:41");
        assert_eq!(clock_label(86_400 * 3 + 23 * 3600 + 5 * 60, 0), "23:05");
    }

    #[test]
    fn clock_label_applies_local_offset() {
        let noon_utc = 86_400 * 10 + 12 * 3600;
        assert_eq!(clock_label(noon_utc, 150), "14:30");
        assert_eq!(clock_label(noon_utc, -13 * 60), "23:00");
        assert_eq!(clock_label(30 * 60, -60), "23:30");
    }

    #[test]
    fn status_lines() {
        let contacts = seed_contacts();
        assert_eq!(contacts[0].status_line(), "online");
        assert_eq!(contacts[1].status_line(), "last seen 14:03");
        assert_eq!(contacts[3].status_line(), "last seen Yesterday");
        assert_eq!(contacts[4].initial(), 'O');
    }
}
