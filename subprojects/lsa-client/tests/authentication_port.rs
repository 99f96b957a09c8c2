use std::cell::RefCell;

use lsa_client::{
    AuthenticationPackage, CallPackageError, Caller, ConnectError, ConnectionState,
    DeregisterError, GroupAttributes, LSA_AUTHENTICATION_PORT_NAME, LogonRequest, LogonType,
    LogonUserError, LookupPackageError, LsaConnection, Luid, MAX_PACKAGE_NAME_LENGTH,
    ReturnBuffer, SidAndAttributes, TokenSource, free_return_buffer,
};
use lsa_proto::{
    ApiMessage, ApiNumber, ConnectionInfo,
    name::name_from_buffer,
    ops::{
        CallAuthenticationPackageReply, CallAuthenticationPackageRequest,
        LogonUserReply, LogonUserRequest,
        LookupAuthenticationPackageReply, LookupAuthenticationPackageRequest,
    },
};
use nt_port::{
    NtStatus,
    handle::RawHandle,
    port::{ConnectError as PortConnectError, RequestError},
    qos::SecurityQos,
    raw::{RawMemory, RawPort},
    status,
};
use zerocopy::{FromBytes, little_endian::*};

const PORT_HANDLE: RawHandle = 0x2C;
const TOKEN_HANDLE: RawHandle = 0x1F0;
const RETURN_BUFFER_ADDRESS: u64 = 0x7FFE_0000;
const PROFILE_BUFFER_ADDRESS: u64 = 0x7FFD_0000;

/// In-process stand-in for the authentication service.
struct MockLsa {
    state: RefCell<MockState>,
}

#[derive(Default)]
struct MockState {
    // Behavior
    packages: Vec<(&'static [u8], u32)>,
    connect_error: Option<NtStatus>,
    connect_status: Option<NtStatus>,
    operational_mode: u32,
    transport_error: Option<NtStatus>,
    call_status: Option<NtStatus>,
    protocol_status: Option<NtStatus>,
    logon_status: Option<NtStatus>,
    sub_status: Option<NtStatus>,
    deregister_status: Option<NtStatus>,

    // Observations
    port_name: Option<String>,
    logon_process_name: Option<Vec<u8>>,
    requests: Vec<ApiNumber>,
    submitted: Vec<(u32, Vec<u8>)>,
    logons: Vec<LogonUserRequest>,
    closed: Vec<RawHandle>,
    freed: Vec<u64>,
}

impl MockLsa {
    fn new() -> Self {
        let state = MockState {
            packages: vec![(&b"NTLM"[..], 0), (&b"Kerberos"[..], 1), (&b"Negotiate"[..], 2)],
            ..Default::default()
        };
        Self {
            state: RefCell::new(state),
        }
    }

    fn with(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.borrow_mut());
        self
    }

    fn transport_calls(&self) -> usize {
        let state = self.state.borrow();
        usize::from(state.port_name.is_some()) + state.requests.len()
    }

    fn serve(&self, msg: &mut ApiMessage) {
        let mut state = self.state.borrow_mut();
        let api = msg.api_number().unwrap();
        state.requests.push(api);

        match api {
            ApiNumber::LookupAuthenticationPackage => {
                let req: LookupAuthenticationPackageRequest = msg.request().unwrap();
                let name = name_from_buffer(&req.package_name, req.package_name_length.get());
                match state.packages.iter().find(|(known, _)| *known == name) {
                    Some(&(_, id)) => msg.set_reply::<LookupAuthenticationPackageRequest>(
                        status::SUCCESS,
                        &LookupAuthenticationPackageReply {
                            package: U32::new(id),
                        },
                    ),
                    None => msg.set_status(status::NO_SUCH_PACKAGE),
                }
            }
            ApiNumber::CallAuthenticationPackage => {
                let req: CallAuthenticationPackageRequest = msg.request().unwrap();
                let len = req.submit_buffer_length.get() as usize;
                let submitted = if len == 0 {
                    Vec::new()
                } else {
                    // SAFETY: the client keeps the submit buffer alive for the round trip.
                    unsafe {
                        std::slice::from_raw_parts(
                            req.protocol_submit_buffer.get() as *const u8,
                            len,
                        )
                    }
                    .to_vec()
                };
                state
                    .submitted
                    .push((req.authentication_package.get(), submitted));

                let protocol_status = state.protocol_status.unwrap_or(status::SUCCESS);
                msg.set_reply::<CallAuthenticationPackageRequest>(
                    state.call_status.unwrap_or(status::SUCCESS),
                    &CallAuthenticationPackageReply {
                        protocol_return_buffer: U64::new(RETURN_BUFFER_ADDRESS),
                        return_buffer_length: U32::new(len as u32 * 2),
                        protocol_status: I32::new(protocol_status.to_i32()),
                    },
                );
            }
            ApiNumber::LogonUser => {
                let req: LogonUserRequest = msg.request().unwrap();
                state.logons.push(req);

                let mut reply = LogonUserReply::default();
                reply.sub_status = I32::new(state.sub_status.unwrap_or(status::SUCCESS).to_i32());
                reply.profile_buffer = U64::new(PROFILE_BUFFER_ADDRESS);
                reply.profile_buffer_length = U32::new(0x60);
                reply.logon_id.low_part = U32::new(0x3E7);
                reply.token = U64::new(TOKEN_HANDLE);
                reply.quotas.paged_pool_limit = U64::new(0x2000_0000);
                reply.quotas.time_limit = I64::new(-1);
                msg.set_reply::<LogonUserRequest>(
                    state.logon_status.unwrap_or(status::SUCCESS),
                    &reply,
                );
            }
            ApiNumber::DeregisterLogonProcess => {
                msg.set_status(state.deregister_status.unwrap_or(status::SUCCESS));
            }
        }
    }
}

impl RawPort for MockLsa {
    fn connect_port(
        &self,
        name: &str,
        _qos: &SecurityQos,
        connect_info: &mut [u8],
    ) -> Result<RawHandle, NtStatus> {
        let mut state = self.state.borrow_mut();
        state.port_name = Some(name.to_owned());
        if let Some(rc) = state.connect_error {
            return Err(rc);
        }

        let info = ConnectionInfo::mut_from_bytes(connect_info).unwrap();
        let name = info.logon_process_name().to_vec();
        info.trusted_caller = U32::new(u32::from(!name.is_empty()));
        if !name.is_empty() {
            state.logon_process_name = Some(name);
        }
        info.operational_mode = U32::new(state.operational_mode);
        info.status = I32::new(state.connect_status.unwrap_or(status::SUCCESS).to_i32());

        Ok(PORT_HANDLE)
    }

    fn request_wait_reply_port(&self, port: RawHandle, message: &mut [u8]) -> NtStatus {
        assert_eq!(port, PORT_HANDLE);
        if let Some(rc) = self.state.borrow().transport_error {
            return rc;
        }

        let msg = ApiMessage::mut_from_message(message).unwrap();
        self.serve(msg);
        status::SUCCESS
    }

    fn close(&self, handle: RawHandle) -> NtStatus {
        self.state.borrow_mut().closed.push(handle);
        status::SUCCESS
    }
}

impl RawMemory for MockLsa {
    fn free_virtual_memory(&self, address: u64) -> NtStatus {
        self.state.borrow_mut().freed.push(address);
        status::SUCCESS
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_register_lookup_call_deregister() {
    init_tracing();
    let lsa = MockLsa::new().with(|s| s.operational_mode = 1);

    let mut conn = LsaConnection::register_logon_process(&lsa, b"MyApp").unwrap();
    assert_eq!(conn.state(), ConnectionState::Connected);
    assert_eq!(conn.operational_mode().0, 1);
    assert!(conn.is_trusted());

    let ntlm = conn.lookup_authentication_package(b"NTLM").unwrap();
    assert_eq!(ntlm, AuthenticationPackage(0));

    let reply = conn
        .call_authentication_package(ntlm, &[0x01, 0x02, 0x03])
        .unwrap();
    assert!(reply.protocol_status.is_success());
    assert_eq!(reply.return_buffer.address(), RETURN_BUFFER_ADDRESS);
    assert_eq!(reply.return_buffer.len(), 6);
    free_return_buffer(&lsa, reply.return_buffer).unwrap();

    conn.deregister().unwrap();
    assert_eq!(conn.state(), ConnectionState::Deregistered);
    drop(conn);

    let state = lsa.state.borrow();
    assert_eq!(state.port_name.as_deref(), Some(LSA_AUTHENTICATION_PORT_NAME));
    assert_eq!(state.logon_process_name.as_deref(), Some(&b"MyApp"[..]));
    assert_eq!(
        state.requests,
        [
            ApiNumber::LookupAuthenticationPackage,
            ApiNumber::CallAuthenticationPackage,
            ApiNumber::DeregisterLogonProcess,
        ]
    );
    assert_eq!(state.submitted, [(0, vec![0x01, 0x02, 0x03])]);
    assert_eq!(state.freed, [RETURN_BUFFER_ADDRESS]);
    // Closed exactly once, drop does not close again
    assert_eq!(state.closed, [PORT_HANDLE]);
}

#[test]
fn test_connect_untrusted_sends_no_name() {
    let lsa = MockLsa::new();

    let conn = LsaConnection::connect_untrusted(&lsa).unwrap();

    assert!(!conn.is_trusted());
    assert_eq!(conn.handle(), PORT_HANDLE);
    assert!(lsa.state.borrow().logon_process_name.is_none());
}

#[test]
fn test_register_rejects_long_name_before_connecting() {
    let lsa = MockLsa::new();
    let name = [b'p'; 128];

    let err = LsaConnection::register_logon_process(&lsa, &name)
        .err()
        .unwrap();

    assert!(matches!(err, ConnectError::NameTooLong(e) if e.len == 128 && e.max == 127));
    assert_eq!(lsa.transport_calls(), 0);
}

#[test]
fn test_register_accepts_maximum_name() {
    let lsa = MockLsa::new();
    let name = [b'p'; 127];

    let conn = LsaConnection::connect(&lsa, Caller::LogonProcess(&name)).unwrap();

    assert_eq!(conn.state(), ConnectionState::Connected);
    assert_eq!(lsa.state.borrow().logon_process_name.as_deref(), Some(&name[..]));
}

#[test]
fn test_connect_port_failure_is_transport_error() {
    let lsa = MockLsa::new().with(|s| s.connect_error = Some(status::OBJECT_NAME_NOT_FOUND));

    let err = LsaConnection::connect_untrusted(&lsa).err().unwrap();

    assert_eq!(err, ConnectError::Connect(PortConnectError::NotFound));
    assert!(lsa.state.borrow().closed.is_empty());
}

#[test]
fn test_rejected_connection_closes_port() {
    let lsa = MockLsa::new().with(|s| s.connect_status = Some(status::ACCESS_DENIED));

    let err = LsaConnection::register_logon_process(&lsa, b"MyApp")
        .err()
        .unwrap();

    assert_eq!(err, ConnectError::ServiceStatus(status::ACCESS_DENIED));
    assert_eq!(lsa.state.borrow().closed, [PORT_HANDLE]);
}

#[test]
fn test_lookup_rejects_long_name_without_transport() {
    let lsa = MockLsa::new();
    let mut conn = LsaConnection::connect_untrusted(&lsa).unwrap();
    let name = [b'k'; MAX_PACKAGE_NAME_LENGTH + 1];

    let err = conn.lookup_authentication_package(&name).unwrap_err();

    assert!(matches!(err, LookupPackageError::NameTooLong(_)));
    assert!(lsa.state.borrow().requests.is_empty());
}

#[test]
fn test_lookup_unknown_package_is_service_status() {
    let lsa = MockLsa::new();
    let mut conn = LsaConnection::connect_untrusted(&lsa).unwrap();

    let err = conn.lookup_authentication_package(b"Digest").unwrap_err();

    assert_eq!(err, LookupPackageError::ServiceStatus(status::NO_SUCH_PACKAGE));
}

#[test]
fn test_lookup_resolves_each_package() {
    let lsa = MockLsa::new();
    let mut conn = LsaConnection::connect_untrusted(&lsa).unwrap();

    assert_eq!(
        conn.lookup_authentication_package(b"Kerberos").unwrap(),
        AuthenticationPackage(1)
    );
    assert_eq!(
        conn.lookup_authentication_package(b"Negotiate").unwrap(),
        AuthenticationPackage(2)
    );
}

#[test]
fn test_call_passes_protocol_status_through() {
    let lsa = MockLsa::new().with(|s| s.protocol_status = Some(status::LOGON_FAILURE));
    let mut conn = LsaConnection::connect_untrusted(&lsa).unwrap();

    let reply = conn
        .call_authentication_package(AuthenticationPackage(2), b"query")
        .unwrap();

    assert_eq!(reply.protocol_status, status::LOGON_FAILURE);
    assert_eq!(reply.return_buffer, ReturnBuffer::from_raw(RETURN_BUFFER_ADDRESS, 10));
    assert_eq!(lsa.state.borrow().submitted, [(2, b"query".to_vec())]);
}

#[test]
fn test_call_with_empty_submit_buffer() {
    let lsa = MockLsa::new();
    let mut conn = LsaConnection::connect_untrusted(&lsa).unwrap();

    let reply = conn
        .call_authentication_package(AuthenticationPackage(0), &[])
        .unwrap();

    assert_eq!(reply.return_buffer.len(), 0);
    assert_eq!(lsa.state.borrow().submitted, [(0, Vec::new())]);
}

#[test]
fn test_call_service_failure_has_no_reply() {
    let lsa = MockLsa::new().with(|s| s.call_status = Some(status::INVALID_PARAMETER));
    let mut conn = LsaConnection::connect_untrusted(&lsa).unwrap();

    let err = conn
        .call_authentication_package(AuthenticationPackage(0), b"x")
        .unwrap_err();

    assert_eq!(err, CallPackageError::ServiceStatus(status::INVALID_PARAMETER));
}

#[test]
fn test_transport_failure_on_every_operation() {
    let lsa = MockLsa::new();
    let mut conn = LsaConnection::register_logon_process(&lsa, b"MyApp").unwrap();
    lsa.state.borrow_mut().transport_error = Some(status::PORT_DISCONNECTED);

    assert_eq!(
        conn.lookup_authentication_package(b"NTLM").unwrap_err(),
        LookupPackageError::Transport(RequestError::PortDisconnected)
    );
    assert_eq!(
        conn.call_authentication_package(AuthenticationPackage(0), b"x")
            .unwrap_err(),
        CallPackageError::Transport(RequestError::PortDisconnected)
    );

    let err = conn.logon_user(&logon_request(None)).unwrap_err();
    assert_eq!(err, LogonUserError::Transport(RequestError::PortDisconnected));
    assert_eq!(err.sub_status(), None);

    // Deregistration can be retried once the transport recovers
    assert_eq!(
        conn.deregister().unwrap_err(),
        DeregisterError::Transport(RequestError::PortDisconnected)
    );
    assert_eq!(conn.state(), ConnectionState::Connected);
    assert!(lsa.state.borrow().closed.is_empty());

    lsa.state.borrow_mut().transport_error = None;
    conn.deregister().unwrap();
    assert_eq!(conn.state(), ConnectionState::Deregistered);
}

fn logon_request(local_groups: Option<&[SidAndAttributes]>) -> LogonRequest<'_> {
    LogonRequest {
        origin_name: b"TestLogon",
        logon_type: LogonType::Interactive,
        package: AuthenticationPackage(1),
        authentication_information: b"credentials",
        local_groups,
        source_context: TokenSource::new(b"Test", Luid::default()),
    }
}

#[test]
fn test_logon_user_returns_session() {
    let lsa = MockLsa::new();
    let mut conn = LsaConnection::register_logon_process(&lsa, b"MyApp").unwrap();
    let groups = [SidAndAttributes {
        sid: 0x1000,
        attributes: GroupAttributes::MANDATORY | GroupAttributes::ENABLED,
    }];

    let reply = conn.logon_user(&logon_request(Some(&groups))).unwrap();

    assert_eq!(reply.token, TOKEN_HANDLE);
    assert_eq!(reply.logon_id.to_u64(), 0x3E7);
    assert_eq!(reply.profile_buffer.address(), PROFILE_BUFFER_ADDRESS);
    assert_eq!(reply.quotas.paged_pool_limit, 0x2000_0000);
    assert_eq!(reply.quotas.time_limit, -1);
    assert!(reply.sub_status.is_success());
    free_return_buffer(&lsa, reply.profile_buffer).unwrap();

    let state = lsa.state.borrow();
    let sent = &state.logons[0];
    assert_eq!(sent.logon_type.get(), 2);
    assert_eq!(sent.authentication_package.get(), 1);
    assert_eq!(sent.origin_name.length.get(), 9);
    assert_eq!(sent.authentication_information_length.get(), 11);
    assert_eq!(sent.local_groups_count.get(), 1);
    assert_eq!(sent.local_groups.get(), groups.as_ptr() as u64);
    assert_eq!(&sent.source_context.source_name, b"Test\0\0\0\0");
}

#[test]
fn test_logon_user_without_groups_sends_null() {
    let lsa = MockLsa::new();
    let mut conn = LsaConnection::connect_untrusted(&lsa).unwrap();

    let reply = conn.logon_user(&logon_request(None)).unwrap();
    free_return_buffer(&lsa, reply.profile_buffer).unwrap();

    let state = lsa.state.borrow();
    assert_eq!(state.logons[0].local_groups_count.get(), 0);
    assert_eq!(state.logons[0].local_groups.get(), 0);
}

#[test]
fn test_logon_failure_exposes_sub_status() {
    let lsa = MockLsa::new().with(|s| {
        s.logon_status = Some(status::ACCOUNT_RESTRICTION);
        s.sub_status = Some(status::ACCOUNT_DISABLED);
    });
    let mut conn = LsaConnection::register_logon_process(&lsa, b"MyApp").unwrap();

    let err = conn.logon_user(&logon_request(None)).unwrap_err();

    assert_eq!(
        err,
        LogonUserError::ServiceStatus {
            status: status::ACCOUNT_RESTRICTION,
            sub_status: status::ACCOUNT_DISABLED,
        }
    );
    assert_eq!(err.sub_status(), Some(status::ACCOUNT_DISABLED));
}

#[test]
fn test_operations_after_deregister_are_invalid_state() {
    let lsa = MockLsa::new();
    let mut conn = LsaConnection::register_logon_process(&lsa, b"MyApp").unwrap();
    conn.deregister().unwrap();
    let requests = lsa.state.borrow().requests.len();

    assert_eq!(
        conn.call_authentication_package(AuthenticationPackage(0), b"x")
            .unwrap_err(),
        CallPackageError::InvalidState
    );
    // State is checked before the name
    assert_eq!(
        conn.lookup_authentication_package(&[b'n'; 200]).unwrap_err(),
        LookupPackageError::InvalidState
    );
    assert_eq!(
        conn.logon_user(&logon_request(None)).unwrap_err(),
        LogonUserError::InvalidState
    );
    assert_eq!(conn.deregister().unwrap_err(), DeregisterError::InvalidState);

    assert_eq!(lsa.state.borrow().requests.len(), requests);
}

#[test]
fn test_deregister_service_failure_still_closes() {
    let lsa = MockLsa::new().with(|s| s.deregister_status = Some(status::UNSUCCESSFUL));
    let mut conn = LsaConnection::register_logon_process(&lsa, b"MyApp").unwrap();

    let err = conn.deregister().unwrap_err();

    assert_eq!(err, DeregisterError::ServiceStatus(status::UNSUCCESSFUL));
    assert_eq!(conn.state(), ConnectionState::Deregistered);
    assert_eq!(lsa.state.borrow().closed, [PORT_HANDLE]);
}

#[test]
fn test_drop_deregisters_connected() {
    init_tracing();
    let lsa = MockLsa::new();
    {
        let _conn = LsaConnection::register_logon_process(&lsa, b"MyApp").unwrap();
    }

    let state = lsa.state.borrow();
    assert_eq!(state.requests, [ApiNumber::DeregisterLogonProcess]);
    assert_eq!(state.closed, [PORT_HANDLE]);
}

#[test]
fn test_drop_closes_port_when_transport_is_down() {
    init_tracing();
    let lsa = MockLsa::new();
    {
        let _conn = LsaConnection::register_logon_process(&lsa, b"MyApp").unwrap();
        lsa.state.borrow_mut().transport_error = Some(status::PORT_DISCONNECTED);
    }

    assert_eq!(lsa.state.borrow().closed, [PORT_HANDLE]);
}

#[test]
fn test_free_return_buffer_null_is_noop() {
    let lsa = MockLsa::new();

    free_return_buffer(&lsa, ReturnBuffer::from_raw(0, 0)).unwrap();

    assert!(lsa.state.borrow().freed.is_empty());
}
