#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpStatus {
    Ok,
    PartialContent,
    MovedPermanently,
    NotModified,
    BadRequest,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    RangeNotSatisfiable,
    InternalServerError,
}

impl HttpStatus {
    pub fn code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::PartialContent => 206,
            Self::MovedPermanently => 301,
            Self::NotModified => 304,
            Self::BadRequest => 400,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::RangeNotSatisfiable => 416,
            Self::InternalServerError => 500,
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::PartialContent => "Partial Content",
            Self::MovedPermanently => "Moved Permanently",
            Self::NotModified => "Not Modified",
            Self::BadRequest => "Bad Request",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::RangeNotSatisfiable => "Range Not Satisfiable",
            Self::InternalServerError => "Internal Server Error",
        }
    }

    /// Body sent with error statuses.
    pub fn error_body(&self) -> &'static str {
        match self {
            Self::NotFound => "404 page not found\n",
            Self::Forbidden => "403 Forbidden\n",
            Self::BadRequest => "400 Bad Request\n",
            Self::MethodNotAllowed => "405 Method Not Allowed\n",
            Self::RangeNotSatisfiable => "416 Requested Range Not Satisfiable\n",
            Self::InternalServerError => "500 Internal Server Error\n",
            _ => "",
        }
    }

    pub fn as_response_line(&self) -> String {
        format!("HTTP/1.1 {} {}\r\n", self.code(), self.text())
    }
}
