use reqwest::{Client as HttpClient, Method, RequestBuilder};
use serde_json::Value;
use url::Url;

use crate::api::models::{
    self, CourseEntry, Department, DepartmentMessage, Grade, Message, NewCourse, Profile, Role, UserId,
};
use crate::error::{ApiError, Result};
use crate::schedule::CourseSource;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

pub struct ApiClient {
    pub http: HttpClient,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        // Trailing slash so that `join` keeps the `/api` segment.
        let base = Url::parse(&format!("{}/", crate::utils::normalize_url(base_url)))?;
        Ok(Self { http: HttpClient::new(), base, token })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    fn with_auth(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ApiError::NotLoggedIn)?;
        Ok(req.bearer_auth(token))
    }

    /// Authenticated request against `path` below the API root.
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        log::debug!("{} {}", method, url.path());
        self.with_auth(self.http.request(method, url))
    }

    async fn send(req: RequestBuilder) -> Result<reqwest::Response> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            log::warn!("request failed with HTTP {}", status);
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(resp)
    }

    /// Some endpoints answer with an empty body; treat that as JSON null.
    async fn send_json(req: RequestBuilder) -> Result<Value> {
        let text = Self::send(req).await?.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub(crate) fn login_request(&self, email: &str, password: &str) -> Result<RequestBuilder> {
        let url = self.endpoint("auth/login")?;
        log::debug!("POST {}", url.path());
        Ok(self.http.post(url).json(&serde_json::json!({ "email": email, "password": password })))
    }

    /// Exchange credentials for a bearer token and keep it on the client.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<String> {
        let json = Self::send_json(self.login_request(email, password)?).await?;
        let token = json
            .get("token")
            .or_else(|| json.get("accessToken"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| ApiError::Decode("token not found in response".into()))?
            .to_string();
        self.token = Some(token.clone());
        Ok(token)
    }

    pub(crate) fn check_token_request(&self) -> Result<RequestBuilder> {
        self.request(Method::GET, "auth/check-token")
    }

    /// Fails with a 401/403 `Status` when the server no longer accepts the token.
    pub async fn check_token(&self) -> Result<()> {
        Self::send(self.check_token_request()?).await?;
        Ok(())
    }

    pub(crate) fn change_password_request(&self, password: &str) -> Result<RequestBuilder> {
        Ok(self
            .request(Method::PUT, "auth/change-password")?
            .json(&serde_json::json!({ "password": password })))
    }

    pub async fn change_password(&self, password: &str) -> Result<()> {
        Self::send(self.change_password_request(password)?).await?;
        Ok(())
    }

    pub async fn current_user(&self) -> Result<Profile> {
        let json = Self::send_json(self.request(Method::GET, "users/getCurrentUser")?).await?;
        serde_json::from_value(json).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// The role endpoint answers with a bare string, sometimes JSON-quoted.
    pub async fn current_user_role(&self) -> Result<Role> {
        let resp = Self::send(self.request(Method::GET, "users/getCurrentUserRole")?).await?;
        let text = resp.text().await?;
        Ok(Role::parse(&text))
    }

    pub async fn teacher_emails(&self) -> Result<Vec<String>> {
        let json = Self::send_json(self.request(Method::GET, "users/getAllTeachersEmail")?).await?;
        Ok(models::normalize_emails(&json))
    }

    pub async fn messages_for_current_user(&self) -> Result<Vec<Message>> {
        let json = Self::send_json(self.request(Method::GET, "messages/getMessagesByCurrentUser")?).await?;
        Ok(models::normalize_messages(&json))
    }

    pub(crate) fn send_message_request(&self, receiver_email: &str, message: &str) -> Result<RequestBuilder> {
        Ok(self.request(Method::POST, "messages/sendMessage")?.json(&serde_json::json!({
            "receiver": { "email": receiver_email },
            "message": message,
        })))
    }

    pub async fn send_message(&self, receiver_email: &str, message: &str) -> Result<()> {
        Self::send(self.send_message_request(receiver_email, message)?).await?;
        Ok(())
    }

    pub(crate) fn department_messages_request(&self, department_id: i64) -> Result<RequestBuilder> {
        self.request(Method::GET, &format!("messages/getDepartmentMessages/{}", department_id))
    }

    pub async fn department_messages(&self, department_id: i64) -> Result<Vec<DepartmentMessage>> {
        let json = Self::send_json(self.department_messages_request(department_id)?).await?;
        Ok(models::normalize_department_messages(&json))
    }

    pub(crate) fn post_to_department_request(
        &self,
        department_id: i64,
        sender_id: Option<UserId>,
        text: &str,
    ) -> Result<RequestBuilder> {
        let path = format!("messages/postToDepartment/{}", department_id);
        Ok(self.request(Method::POST, &path)?.json(&serde_json::json!({
            "senderId": sender_id,
            "value": text,
        })))
    }

    pub async fn post_to_department(&self, department_id: i64, sender_id: Option<UserId>, text: &str) -> Result<()> {
        Self::send(self.post_to_department_request(department_id, sender_id, text)?).await?;
        Ok(())
    }

    pub(crate) fn grades_request(&self) -> Result<RequestBuilder> {
        self.request(Method::GET, "grade/getAllByCurrentUser")
    }

    pub async fn grades_for_current_user(&self) -> Result<Vec<Grade>> {
        let json = Self::send_json(self.grades_request()?).await?;
        Ok(models::normalize_grades(&json))
    }

    pub(crate) fn courses_request(&self, source: &CourseSource) -> Result<RequestBuilder> {
        match source {
            CourseSource::CurrentUser => self.request(Method::GET, "course/getCourseByCurrentUser"),
            CourseSource::ByTeacher => self.request(Method::GET, "course/getCoursesByTeacher"),
            CourseSource::ByDepartment(name) => Ok(self
                .request(Method::GET, "course/getCourseByDepartmentName")?
                .query(&[("name", name.as_str())])),
        }
    }

    pub async fn courses(&self, source: &CourseSource) -> Result<Vec<CourseEntry>> {
        let json = Self::send_json(self.courses_request(source)?).await?;
        Ok(models::normalize_courses(&json))
    }

    pub async fn create_course(&self, course: &NewCourse) -> Result<()> {
        let req = self.request(Method::POST, "course/create")?.json(&course.to_body());
        Self::send(req).await?;
        Ok(())
    }

    pub async fn delete_course(&self, id: i64) -> Result<()> {
        Self::send(self.request(Method::DELETE, &format!("course/deleteById/{}", id))?).await?;
        Ok(())
    }

    pub async fn departments(&self) -> Result<Vec<Department>> {
        let json = Self::send_json(self.request(Method::GET, "departments/getAll")?).await?;
        Ok(models::normalize_departments(&json))
    }
}
