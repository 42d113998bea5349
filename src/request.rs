//! Request descriptors: the read-only view the timing wrapper tags its lines with.

/// Anything that can report a method and a path for log tagging.
///
/// Both accessors are optional. A descriptor missing either field still gets
/// timed; the missing part is rendered as an empty string.
pub trait RequestDescriptor {
    fn method(&self) -> Option<&str>;
    fn path(&self) -> Option<&str>;
}

impl<T: RequestDescriptor + ?Sized> RequestDescriptor for &T {
    fn method(&self) -> Option<&str> { (**self).method() }
    fn path(&self) -> Option<&str> { (**self).path() }
}

/// hyper / `http` requests report the path *with* its query string, which is
/// what a reverse proxy's access log would show.
impl<B> RequestDescriptor for http::Request<B> {
    fn method(&self) -> Option<&str> {
        Some(http::Request::method(self).as_str())
    }

    fn path(&self) -> Option<&str> {
        let uri = self.uri();
        Some(uri.path_and_query().map_or(uri.path(), |pq| pq.as_str()))
    }
}

/// An owned request descriptor for hosts that are not built on `http`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Request {
    pub(crate) method: Option<String>,
    pub(crate) path: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl RequestDescriptor for Request {
    fn method(&self) -> Option<&str> { self.method.as_deref() }
    fn path(&self) -> Option<&str> { self.path.as_deref() }
}

/// Owned copy of a descriptor's method and path, taken before the request is
/// moved into the handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Tag {
    pub(crate) method: String,
    pub(crate) path: String,
}

impl Tag {
    pub(crate) fn of(req: &impl RequestDescriptor) -> Self {
        Self {
            method: req.method().unwrap_or_default().to_owned(),
            path: req.path().unwrap_or_default().to_owned(),
        }
    }
}
