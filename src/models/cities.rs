#[derive(Queryable)]
pub struct City {
    pub id: u64,
    pub name: String,
    pub department_id: u64,
}
