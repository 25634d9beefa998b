//! Request and response types of the prediction service

use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::pipeline::target::{CreditClass, RiskTier};

/// A numeric field that may arrive as a number or as polluted text (`"23_"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirtyNumber {
    Number(f64),
    Text(String),
}

impl DirtyNumber {
    /// Text handed to the numeric cleaner
    pub fn as_text(&self) -> String {
        match self {
            DirtyNumber::Number(n) => n.to_string(),
            DirtyNumber::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for DirtyNumber {
    fn from(value: f64) -> Self {
        DirtyNumber::Number(value)
    }
}

impl From<&str> for DirtyNumber {
    fn from(value: &str) -> Self {
        DirtyNumber::Text(value.to_string())
    }
}

/// One applicant. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditApplication {
    #[serde(rename = "Age")]
    pub age: DirtyNumber,
    #[serde(rename = "Occupation")]
    pub occupation: String,
    #[serde(rename = "Annual_Income")]
    pub annual_income: DirtyNumber,
    #[serde(rename = "Monthly_Inhand_Salary")]
    pub monthly_inhand_salary: DirtyNumber,
    #[serde(rename = "Num_Bank_Accounts")]
    pub num_bank_accounts: DirtyNumber,
    #[serde(rename = "Num_Credit_Card")]
    pub num_credit_card: DirtyNumber,
    #[serde(rename = "Interest_Rate")]
    pub interest_rate: DirtyNumber,
    #[serde(rename = "Num_of_Loan")]
    pub num_of_loan: DirtyNumber,
    #[serde(rename = "Delay_from_due_date")]
    pub delay_from_due_date: DirtyNumber,
    #[serde(rename = "Num_of_Delayed_Payment")]
    pub num_of_delayed_payment: DirtyNumber,
    #[serde(rename = "Changed_Credit_Limit")]
    pub changed_credit_limit: DirtyNumber,
    #[serde(rename = "Num_Credit_Inquiries")]
    pub num_credit_inquiries: DirtyNumber,
    #[serde(rename = "Credit_Mix")]
    pub credit_mix: String,
    #[serde(rename = "Outstanding_Debt")]
    pub outstanding_debt: DirtyNumber,
    #[serde(rename = "Credit_Utilization_Ratio")]
    pub credit_utilization_ratio: f64,
    #[serde(rename = "Payment_of_Min_Amount")]
    pub payment_of_min_amount: String,
    #[serde(rename = "Total_EMI_per_month")]
    pub total_emi_per_month: DirtyNumber,
    #[serde(rename = "Amount_invested_monthly")]
    pub amount_invested_monthly: DirtyNumber,
    #[serde(rename = "Payment_Behaviour")]
    pub payment_behaviour: String,
    #[serde(rename = "Monthly_Balance")]
    pub monthly_balance: DirtyNumber,
}

impl CreditApplication {
    /// One-row batch with the columns in field order
    pub fn to_frame(&self) -> Result<DataFrame> {
        let dirty = |name: &str, value: &DirtyNumber| Column::new(name.into(), [value.as_text()]);
        let text = |name: &str, value: &str| Column::new(name.into(), [value.to_string()]);

        let columns = vec![
            dirty("Age", &self.age),
            text("Occupation", &self.occupation),
            dirty("Annual_Income", &self.annual_income),
            dirty("Monthly_Inhand_Salary", &self.monthly_inhand_salary),
            dirty("Num_Bank_Accounts", &self.num_bank_accounts),
            dirty("Num_Credit_Card", &self.num_credit_card),
            dirty("Interest_Rate", &self.interest_rate),
            dirty("Num_of_Loan", &self.num_of_loan),
            dirty("Delay_from_due_date", &self.delay_from_due_date),
            dirty("Num_of_Delayed_Payment", &self.num_of_delayed_payment),
            dirty("Changed_Credit_Limit", &self.changed_credit_limit),
            dirty("Num_Credit_Inquiries", &self.num_credit_inquiries),
            text("Credit_Mix", &self.credit_mix),
            dirty("Outstanding_Debt", &self.outstanding_debt),
            Column::new("Credit_Utilization_Ratio".into(), [self.credit_utilization_ratio]),
            text("Payment_of_Min_Amount", &self.payment_of_min_amount),
            dirty("Total_EMI_per_month", &self.total_emi_per_month),
            dirty("Amount_invested_monthly", &self.amount_invested_monthly),
            text("Payment_Behaviour", &self.payment_behaviour),
            dirty("Monthly_Balance", &self.monthly_balance),
        ];

        Ok(DataFrame::new(columns)?)
    }
}

/// Per-class probabilities, rounded to three decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    #[serde(rename = "Good")]
    pub good: f64,
    #[serde(rename = "Standard")]
    pub standard: f64,
    #[serde(rename = "Poor")]
    pub poor: f64,
}

impl ClassProbabilities {
    /// Build from a probability vector indexed by class code
    pub fn from_codes(probs: &[f64]) -> Self {
        let at = |class: CreditClass| round3(probs.get(class.code()).copied().unwrap_or(0.0));
        Self {
            good: at(CreditClass::Good),
            standard: at(CreditClass::Standard),
            poor: at(CreditClass::Poor),
        }
    }

    pub fn total(&self) -> f64 {
        self.good + self.standard + self.poor
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub credit_score: CreditClass,
    pub probability: ClassProbabilities,
    pub risk_level: RiskTier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Age": 34, "Occupation": "Engineer", "Annual_Income": 65000.0,
        "Monthly_Inhand_Salary": 4500.0, "Num_Bank_Accounts": 4, "Num_Credit_Card": 3,
        "Interest_Rate": 15, "Num_of_Loan": 2, "Delay_from_due_date": 5,
        "Num_of_Delayed_Payment": 1, "Changed_Credit_Limit": 1200.0,
        "Num_Credit_Inquiries": 4, "Credit_Mix": "Good", "Outstanding_Debt": 800.0,
        "Credit_Utilization_Ratio": 30.0, "Payment_of_Min_Amount": "No",
        "Total_EMI_per_month": 150.0, "Amount_invested_monthly": 80.0,
        "Payment_Behaviour": "High_spent_Small_value_payments", "Monthly_Balance": 350.0
    }"#;

    #[test]
    fn test_deserialize_sample_request() {
        let app: CreditApplication = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(app.age, DirtyNumber::Number(34.0));
        assert_eq!(app.occupation, "Engineer");
        assert_eq!(app.credit_utilization_ratio, 30.0);
    }

    #[test]
    fn test_dirty_text_accepted() {
        let json = SAMPLE.replace("\"Age\": 34", "\"Age\": \"34_\"");
        let app: CreditApplication = serde_json::from_str(&json).unwrap();
        assert_eq!(app.age, DirtyNumber::Text("34_".to_string()));
    }

    #[test]
    fn test_missing_or_null_field_rejected() {
        let missing = SAMPLE.replace("\"Occupation\": \"Engineer\",", "");
        assert!(serde_json::from_str::<CreditApplication>(&missing).is_err());

        let null = SAMPLE.replace("\"Age\": 34", "\"Age\": null");
        assert!(serde_json::from_str::<CreditApplication>(&null).is_err());
    }

    #[test]
    fn test_to_frame_layout() {
        let app: CreditApplication = serde_json::from_str(SAMPLE).unwrap();
        let df = app.to_frame().unwrap();

        assert_eq!(df.shape(), (1, 20));
        assert_eq!(df.get_column_names()[0].as_str(), "Age");
        assert_eq!(df.get_column_names()[19].as_str(), "Monthly_Balance");
        assert_eq!(df.column("Age").unwrap().dtype(), &DataType::String);
        assert_eq!(
            df.column("Credit_Utilization_Ratio").unwrap().dtype(),
            &DataType::Float64
        );
    }

    #[test]
    fn test_number_text_is_plain_decimal() {
        assert_eq!(DirtyNumber::Number(65000.0).as_text(), "65000");
        assert_eq!(DirtyNumber::Number(0.00001).as_text(), "0.00001");
    }

    #[test]
    fn test_probabilities_rounded() {
        let p = ClassProbabilities::from_codes(&[0.12345, 0.54321, 0.33334]);
        assert_eq!(p.good, 0.123);
        assert_eq!(p.standard, 0.543);
        assert_eq!(p.poor, 0.333);
    }

    #[test]
    fn test_response_serialization() {
        let response = PredictionResponse {
            credit_score: CreditClass::Poor,
            probability: ClassProbabilities {
                good: 0.1,
                standard: 0.2,
                poor: 0.7,
            },
            risk_level: RiskTier::High,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["credit_score"], "Poor");
        assert_eq!(json["risk_level"], "High");
        assert_eq!(json["probability"]["Poor"], 0.7);
    }
}
