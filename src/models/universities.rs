#[derive(Queryable)]
pub struct University {
    pub id: u64,
    pub name: String,
    pub acronym: Option<String>,
    pub department: Option<String>,
    pub city: Option<String>,
    pub kind: Option<String>,
    pub status: String,
}
