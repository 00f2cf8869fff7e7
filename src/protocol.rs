use serde::Serialize;

#[derive(Default, Serialize)]
pub struct SimpleResponse {
    pub success: bool,
    pub err: String,
}

impl SimpleResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            err: "".to_string(),
        }
    }
}

#[macro_export]
macro_rules! impl_err_response {
    ( $( $type:ty),+ $(,)? ) => {
        $(
            impl $type {
                pub fn err<S: ToString>(err: S) -> Self {
                    Self {
                        success: false,
                        err: err.to_string(),
                        ..Default::default()
                    }
                }
            }
        )+
    };
}

impl_err_response! {
    SimpleResponse,
}

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;

/// Position of a result page, echoed back with every paginated search.
#[derive(Default, Serialize, Debug, PartialEq)]
pub struct PageInfo {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
}

impl PageInfo {
    /// Clamps the requested page and page size. Pages are 1-based.
    pub fn request(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).max(1).min(MAX_PER_PAGE),
            total: 0,
            pages: 0,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn with_total(self, total: i64) -> Self {
        let pages = (total + self.per_page - 1) / self.per_page;
        Self {
            total,
            pages,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_to_first_page_of_ten() {
        let page = PageInfo::request(None, None);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 10);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let page = PageInfo::request(Some(-3), Some(10_000));
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn offset_and_page_count() {
        let page = PageInfo::request(Some(3), Some(10)).with_total(21);
        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 10);
        assert_eq!(page.pages, 3);
        assert_eq!(PageInfo::request(None, None).with_total(0).pages, 0);
    }

    #[test]
    fn err_response_carries_message() {
        let res = SimpleResponse::err("boom");
        assert!(!res.success);
        assert_eq!(res.err, "boom");
    }
}
