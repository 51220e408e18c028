use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::catalog::list_tiers,
        crate::api::catalog::list_currencies,
        crate::api::payments::mpesa_charge,
        crate::api::payments::mpesa_verify,
        crate::api::payments::mpesa_submit_otp,
        crate::api::payments::card_initialize,
        crate::api::payments::card_verify,
        crate::api::transactions::list_transactions,
        crate::api::transactions::transaction_totals,
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::servers::create_server,
        crate::api::servers::list_servers,
        crate::api::servers::delete_server,
        crate::api::webhooks::paystack_webhook
    ),
    components(
        schemas(
            crate::api::payments::MpesaChargeRequest,
            crate::api::payments::SubmitOtpRequest,
            crate::api::payments::CardInitializeRequest,
            crate::api::auth::RegisterRequest,
            crate::api::auth::LoginRequest,
            crate::api::auth::UserProfile,
            crate::api::servers::CreateServerRequest,
            crate::servers::ServerSummary,
            crate::servers::ServerStatus,
            crate::tiers::Tier,
            crate::tiers::TierInfo,
            crate::wallet::Transaction,
            crate::wallet::WalletSummary,
            crate::ledger::SpendingRecord,
            crate::currency::CurrencyRate
        )
    ),
    tags(
        (name = "payments", description = "M-Pesa and card deposits"),
        (name = "wallet", description = "Balance and transaction history"),
        (name = "auth", description = "Panel accounts"),
        (name = "servers", description = "Hosted servers"),
        (name = "catalog", description = "Plans and currencies")
    )
)]
pub struct ApiDoc;
