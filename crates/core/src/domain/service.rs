use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cpq::catalog::CatalogError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    VirtualPbx,
    WhatsappBusiness,
    OwnPbx,
    Sms,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::VirtualPbx,
        ServiceKind::WhatsappBusiness,
        ServiceKind::OwnPbx,
        ServiceKind::Sms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VirtualPbx => "virtual-pbx",
            Self::WhatsappBusiness => "whatsapp-business",
            Self::OwnPbx => "own-pbx",
            Self::Sms => "sms",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|service| service.as_str() == value.trim())
            .ok_or_else(|| format!("unknown service `{value}`"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentPlan {
    Monthly,
    SemiAnnual,
    Yearly,
}

impl PaymentPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::SemiAnnual => "semi-annual",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for PaymentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer obtains the outbound number on the products step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberAcquisition {
    New,
    Transfer,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(pub String);

impl CampaignId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub const WELCOME_CAMPAIGN: &str = "welcome-campaign";
pub const BUSINESS_PRO_CAMPAIGN: &str = "business-pro";
pub const STARTUP_SPECIAL_CAMPAIGN: &str = "startup-special";

const CAMPAIGN_TITLES: [(&str, &str); 3] = [
    (WELCOME_CAMPAIGN, "Hoş Geldin Kampanyası"),
    (BUSINESS_PRO_CAMPAIGN, "Business Pro Kampanyası"),
    (STARTUP_SPECIAL_CAMPAIGN, "Startup Özel Kampanyası"),
];

/// Campaign ids offered on the campaigns step.
pub fn known_campaigns() -> [CampaignId; 3] {
    CAMPAIGN_TITLES.map(|(id, _)| CampaignId::new(id))
}

pub fn campaign_title(campaign: &CampaignId) -> Option<&'static str> {
    CAMPAIGN_TITLES.iter().find(|(id, _)| *id == campaign.0).map(|(_, title)| *title)
}

pub fn ensure_known_campaign(campaign: &CampaignId) -> Result<(), CatalogError> {
    if known_campaigns().contains(campaign) {
        Ok(())
    } else {
        Err(CatalogError::UnknownCampaign(campaign.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        campaign_title, ensure_known_campaign, known_campaigns, CampaignId, PaymentPlan,
        ServiceKind,
    };

    #[test]
    fn service_ids_round_trip_through_their_wire_names() {
        for service in ServiceKind::ALL {
            assert_eq!(service.as_str().parse::<ServiceKind>(), Ok(service));
        }
        assert!("fax".parse::<ServiceKind>().is_err());
    }

    #[test]
    fn payment_plan_serializes_kebab_case() {
        let json = serde_json::to_string(&PaymentPlan::SemiAnnual).expect("serialize plan");
        assert_eq!(json, "\"semi-annual\"");
    }

    #[test]
    fn unknown_campaign_is_rejected() {
        assert!(ensure_known_campaign(&CampaignId::new("business-pro")).is_ok());
        assert!(ensure_known_campaign(&CampaignId::new("black-friday")).is_err());
    }

    #[test]
    fn every_known_campaign_has_a_title() {
        for campaign in known_campaigns() {
            assert!(campaign_title(&campaign).is_some(), "{campaign} needs a title");
        }
        assert_eq!(
            campaign_title(&CampaignId::new("business-pro")),
            Some("Business Pro Kampanyası")
        );
        assert_eq!(campaign_title(&CampaignId::new("black-friday")), None);
    }
}
