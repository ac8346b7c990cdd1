//! User-facing alert texts.
//!
//! The server speaks Korean, so the client does too.

pub const MISSING_FILES: &str = "모든 필수 파일을 선택해주세요.";
pub const MISSING_FILE: &str = "파일을 선택해주세요.";
pub const UNREADABLE: &str = "파일을 읽을 수 없습니다";
pub const BUSY: &str = "이전 요청을 처리 중입니다. 잠시 후 다시 시도해주세요.";
pub const TRANSPORT: &str = "서버 통신 중 오류가 발생했습니다.";

pub const UPLOAD_FALLBACK: &str = "파일 처리 중 오류가 발생했습니다.";
pub const CONVERT_FALLBACK: &str = "변환 중 오류가 발생했습니다.";

pub const RENDER_FAILED: &str = "응답 처리 중 오류가 발생했습니다";
pub const DOWNLOAD_FAILED: &str = "다운로드 처리 중 오류가 발생했습니다";

pub const CONVERT_DONE: &str = "변환이 완료되었습니다. JSON 파일이 다운로드됩니다.";
