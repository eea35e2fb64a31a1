//! Abstractions for page-number pagination.

use std::num::NonZeroUsize;

/// Pagination arguments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments {
    /// Requested page number, starting from `1`.
    ///
    /// May point outside of the available pages, in which case the nearest
    /// valid page is resolved by [`Arguments::window()`].
    pub page: i64,

    /// Number of items on a single page.
    pub per_page: NonZeroUsize,
}

impl Arguments {
    /// Creates new [`Arguments`] requesting the provided `page`.
    ///
    /// Requests the first page if no `page` is provided.
    #[must_use]
    pub fn new(page: Option<i64>, per_page: NonZeroUsize) -> Self {
        Self {
            page: page.unwrap_or(1),
            per_page,
        }
    }

    /// Resolves these [`Arguments`] against the `total` number of items.
    #[must_use]
    pub fn window(&self, total: usize) -> Window {
        let per_page = self.per_page.get();
        let num_pages = total.div_ceil(per_page).max(1);
        let number = usize::try_from(self.page.max(1))
            .unwrap_or(usize::MAX)
            .min(num_pages);

        Window {
            number,
            num_pages,
            offset: (number - 1) * per_page,
            limit: per_page,
            total,
        }
    }
}

/// Resolved slice of items being selected for a [`Page`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Window {
    /// Number of the resolved page, starting from `1`.
    pub number: usize,

    /// Total number of pages (at least `1`).
    pub num_pages: usize,

    /// Number of items to skip.
    pub offset: usize,

    /// Maximum number of items to take.
    pub limit: usize,

    /// Total number of items across all pages.
    pub total: usize,
}

/// A single page of items.
#[derive(Clone, Debug)]
pub struct Page<I> {
    /// Items on this [`Page`].
    pub items: Vec<I>,

    /// [`Window`] this [`Page`] was selected with.
    pub window: Window,
}

impl<I> Page<I> {
    /// Creates a new [`Page`] from the provided items.
    #[must_use]
    pub fn new(window: Window, items: impl IntoIterator<Item = I>) -> Self {
        Self {
            items: items.into_iter().collect(),
            window,
        }
    }

    /// Creates a new empty [`Page`] as if there were no items at all.
    #[must_use]
    pub fn empty(arguments: &Arguments) -> Self {
        Self::new(arguments.window(0), [])
    }

    /// Returns [`PageInfo`] of this [`Page`].
    #[must_use]
    pub fn page_info(&self) -> PageInfo {
        let Window {
            number,
            num_pages,
            total,
            ..
        } = self.window;
        PageInfo {
            number,
            num_pages,
            total_count: total,
            has_next_page: number < num_pages,
            has_previous_page: number > 1,
        }
    }

    /// Maps items of this [`Page`] with the provided function.
    #[must_use]
    pub fn map<T>(self, f: impl FnMut(I) -> T) -> Page<T> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            window: self.window,
        }
    }
}

/// Information about a [`Page`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageInfo {
    /// Number of the [`Page`], starting from `1`.
    pub number: usize,

    /// Total number of pages.
    pub num_pages: usize,

    /// Total number of items across all pages.
    pub total_count: usize,

    /// Indicator whether there is a next page.
    pub has_next_page: bool,

    /// Indicator whether there is a previous page.
    pub has_previous_page: bool,
}

/// Pagination selector.
#[derive(Clone, Debug)]
pub struct Selector<F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Additional filter being applied to the result.
    pub filter: F,
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty) => {
        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "An information about a [`Page`]."]
        pub type PageInfo = $crate::pagination::PageInfo;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter>;
    };
}

#[cfg(test)]
mod spec {
    use std::num::NonZeroUsize;

    use super::{Arguments, Page};

    fn args(page: i64, per_page: usize) -> Arguments {
        Arguments::new(Some(page), NonZeroUsize::new(per_page).unwrap())
    }

    #[test]
    fn resolves_requested_page() {
        let w = args(2, 6).window(20);

        assert_eq!(w.number, 2);
        assert_eq!(w.num_pages, 4);
        assert_eq!(w.offset, 6);
        assert_eq!(w.limit, 6);
    }

    #[test]
    fn clamps_to_nearest_valid_page() {
        assert_eq!(args(0, 6).window(20).number, 1);
        assert_eq!(args(-3, 6).window(20).number, 1);
        assert_eq!(args(99, 6).window(20).number, 4);
        assert_eq!(args(99, 6).window(20).offset, 18);
        assert_eq!(args(i64::MAX, 10).window(11).number, 2);
    }

    #[test]
    fn empty_result_has_single_page() {
        let page = Page::<()>::empty(&args(5, 10));
        let info = page.page_info();

        assert_eq!(info.number, 1);
        assert_eq!(info.num_pages, 1);
        assert_eq!(info.total_count, 0);
        assert!(!info.has_next_page);
        assert!(!info.has_previous_page);
    }

    #[test]
    fn reports_neighbours() {
        let page = Page::new(args(2, 6).window(13), [1, 2, 3, 4, 5, 6]);
        let info = page.page_info();

        assert_eq!(info.num_pages, 3);
        assert!(info.has_next_page);
        assert!(info.has_previous_page);
    }

    #[test]
    fn defaults_to_first_page() {
        let args = Arguments::new(None, NonZeroUsize::new(6).unwrap());

        assert_eq!(args.window(100).number, 1);
    }
}
