#[derive(Queryable)]
pub struct Department {
    pub id: u64,
    pub name: String,
}
