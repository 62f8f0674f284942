//! Shared constants used across the application.

/// User agent string sent with every forum request.
pub const USER_AGENT: &str = "forum-moderator/0.1";

/// Forum root used when `FORUM_BASE_URL` is not set.
pub const DEFAULT_FORUM_BASE_URL: &str = "http://www.mitbbs.com/";

/// The forum serves GB2312 pages without a reliable charset header.
pub const DEFAULT_PAGE_ENCODING: &str = "gb2312";

/// Login endpoint, relative to the forum base URL.
pub const LOGIN_PATH: &str = "newindex/mitbbs_bbslogin.php";

/// Delete endpoint, relative to the forum base URL.
pub const DELETE_PATH: &str = "mitbbs_bbsdel.php";

/// Header marker ("posted from station") where user-authored content begins.
pub const STATION_MARKER: &str = "发信站";

/// Visible label of the delete control in each post row.
pub const DELETE_VERB: &str = "删除";

/// Response body substring confirming a deletion ("deleted successfully").
pub const DELETE_SUCCESS_MARKER: &str = "删除成功";

/// Number of threads between progress log lines.
pub const PROGRESS_INTERVAL: usize = 10;
