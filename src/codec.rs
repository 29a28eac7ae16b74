use crate::models::Note;

pub fn encode<'a, I>(notes: I) -> serde_json::Result<String>
where
    I: IntoIterator<Item = &'a Note>,
{
    let notes: Vec<&Note> = notes.into_iter().collect();
    serde_json::to_string(&notes)
}

pub fn decode(raw: &str) -> serde_json::Result<Vec<Note>> {
    serde_json::from_str(raw)
}
