//! This file defines the templates and a convenience function for creating the navigation bar.

use maud::{Markup, html};

use crate::endpoints;

/// Template for a link in the navigation bar.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
#[derive(Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-blue-700 rounded-sm md:bg-transparent
        md:text-blue-700 md:p-0 dark:text-white md:dark:text-blue-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
        md:hover:bg-transparent md:border-0 md:hover:text-blue-700 md:p-0
        dark:text-white md:dark:hover:text-blue-500 dark:hover:bg-gray-700
        dark:hover:text-white md:dark:hover:bg-transparent"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        )
    }
}

pub struct NavBar<'a> {
    username: Option<&'a str>,
    links: Vec<Link<'a>>,
}

impl<'a> NavBar<'a> {
    /// Get the navigation bar for the user called `username`, or for an
    /// anonymous visitor if `username` is `None`.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn new(active_endpoint: &str, username: Option<&'a str>) -> NavBar<'a> {
        let link = |url: &'a str, title: &'a str| Link {
            url,
            title,
            is_current: active_endpoint == url,
        };

        let links = if username.is_some() {
            vec![
                link(endpoints::ROOT, "Dashboard"),
                link(endpoints::EXPENSES_VIEW, "Expenses"),
                link(endpoints::ADD_TRANSACTION_VIEW, "Add Transaction"),
                Link {
                    url: endpoints::LOG_OUT,
                    title: "Log out",
                    is_current: false,
                },
            ]
        } else {
            vec![
                link(endpoints::ROOT, "Dashboard"),
                link(endpoints::LOG_IN_VIEW, "Log in"),
                link(endpoints::SIGN_UP_VIEW, "Sign up"),
            ]
        };

        NavBar { username, links }
    }

    pub fn into_html(self) -> Markup {
        // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::ROOT)
                        class="flex items-center space-x-3 rtl:space-x-reverse"
                    {
                        span
                            class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "MoneyPal"
                        }
                    }

                    div class="w-full md:block md:w-auto"
                    {
                        ul
                            class="font-medium flex flex-col p-4 md:p-0 mt-4
                            border border-gray-100 rounded bg-gray-50
                            md:flex-row md:items-center md:space-x-8 rtl:space-x-reverse md:mt-0
                            md:border-0 md:bg-white dark:bg-gray-800
                            md:dark:bg-gray-900 dark:border-gray-700"
                        {
                            @if let Some(username) = self.username {
                                li class="py-2 px-3 md:p-0 text-gray-500 dark:text-gray-400"
                                {
                                    "Hi, " (username)
                                }
                            }

                            @for link in self.links {
                                li { (link.into_html()) }
                            }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use std::collections::HashMap;

    use crate::{endpoints, navigation::NavBar};

    #[test]
    fn set_active_endpoint() {
        let mut cases = HashMap::new();
        cases.insert(endpoints::ROOT, true);
        cases.insert(endpoints::EXPENSES_VIEW, true);
        cases.insert(endpoints::ADD_TRANSACTION_VIEW, true);

        cases.insert(endpoints::LOG_OUT, false);
        cases.insert(endpoints::LOG_IN_VIEW, false);
        cases.insert(endpoints::SIGN_UP_VIEW, false);
        cases.insert(endpoints::TRANSACTIONS_API, false);

        for (endpoint, should_be_active) in cases {
            let nav_bar = NavBar::new(endpoint, Some("alice"));

            assert_link_active(nav_bar, endpoint, should_be_active);
        }
    }

    #[test]
    fn anonymous_visitor_gets_log_in_and_sign_up_links() {
        let nav_bar = NavBar::new(endpoints::ROOT, None);

        let urls: Vec<_> = nav_bar.links.iter().map(|link| link.url).collect();

        assert_eq!(
            urls,
            [
                endpoints::ROOT,
                endpoints::LOG_IN_VIEW,
                endpoints::SIGN_UP_VIEW
            ]
        );
    }

    #[test]
    fn shows_username_when_logged_in() {
        let html = NavBar::new(endpoints::ROOT, Some("alice"))
            .into_html()
            .into_string();

        assert!(html.contains("Hi, alice"));
        assert!(html.contains(endpoints::LOG_OUT));
    }

    #[track_caller]
    fn assert_link_active(nav_bar: NavBar<'_>, endpoint: &str, should_be_active: bool) {
        let get_active_string = |is_active: bool| -> &str {
            if is_active {
                "active (true)"
            } else {
                "inactive (false)"
            }
        };

        for link in nav_bar.links {
            if link.url == endpoint {
                assert_eq!(
                    link.is_current,
                    should_be_active,
                    "Link for current page should be {} but got {}",
                    get_active_string(should_be_active),
                    get_active_string(link.is_current),
                )
            } else {
                assert!(
                    !link.is_current,
                    "Link for inactive page should {} but got {}",
                    get_active_string(false),
                    get_active_string(link.is_current)
                )
            }
        }
    }
}
