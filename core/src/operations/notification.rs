use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::{list_or_empty, Operation};
use crate::error::ApiError;
use crate::request::RequestDescriptor;
use crate::types::{Enveloped, Notification};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListNotifications;

impl Operation for ListNotifications {
    const NAME: &'static str = "notification.list";
    type Body = Enveloped<Vec<Notification>>;
    type Output = Vec<Notification>;

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        Ok(RequestDescriptor::get("notification"))
    }

    fn output(body: Self::Body) -> Vec<Notification> {
        list_or_empty(body)
    }
}

/// Register the device's push token for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPushToken {
    pub fcm_token: String,
}

impl Operation for RegisterPushToken {
    const NAME: &'static str = "notification.fcm";
    type Body = IgnoredAny;
    type Output = ();

    fn descriptor(&self) -> Result<RequestDescriptor, ApiError> {
        RequestDescriptor::post("notification/fcm").json(self)
    }

    fn output(_body: IgnoredAny) {}
}
